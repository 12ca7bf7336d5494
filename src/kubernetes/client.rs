// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation

use crate::config::Config;
use crate::error::{LegateError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::path::Path;
use tracing::{info, instrument};

/// Create the client used for Secret and ConfigMap lookups
#[instrument(skip(config))]
pub async fn create_client(config: &Config) -> Result<Client> {
    match &config.kubeconfig_path {
        Some(path) => create_client_from_file(path).await,
        None => Ok(Client::try_default().await?),
    }
}

async fn create_client_from_file(path: &Path) -> Result<Client> {
    info!("Loading kubeconfig from {}", path.display());

    let kubeconfig = tokio::fs::read_to_string(path).await.map_err(|e| {
        LegateError::KubeconfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    create_client_from_kubeconfig(&kubeconfig).await
}

/// Create a Kubernetes client from a kubeconfig string
async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| LegateError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| LegateError::KubeconfigError(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| LegateError::KubeconfigError(format!("Failed to create client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_kubeconfig_rejected() {
        // kube::Client isn't Debug, so unwrap_err() is unavailable
        let Err(err) = create_client_from_kubeconfig("clusters: [not, a, kubeconfig").await else {
            panic!("expected an invalid kubeconfig to be rejected");
        };
        assert!(matches!(err, LegateError::KubeconfigError(_)));
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_file() {
        let err = create_client_from_file(Path::new("/nonexistent/legate/kubeconfig"))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to read"));
    }
}
