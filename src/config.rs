// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{env as vars, DEFAULT_LISTEN_ADDRESS, DEFAULT_SOLVER_NAME};
use anyhow::{bail, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Webhook configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// API group the solver is served under
    pub group_name: String,
    pub solver_name: String,
    pub listen_address: SocketAddr,
    /// Certificate and key, serve plain HTTP when absent
    pub tls: Option<TlsFiles>,
    pub kubeconfig_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let group_name =
            non_empty(vars::GROUP_NAME).context("GROUP_NAME must be specified")?;
        let solver_name =
            non_empty(vars::SOLVER_NAME).unwrap_or_else(|| DEFAULT_SOLVER_NAME.to_string());

        let listen_address = non_empty(vars::LISTEN_ADDRESS)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.to_string());
        let listen_address: SocketAddr = listen_address
            .parse()
            .with_context(|| format!("Invalid LISTEN_ADDRESS {:?}", listen_address))?;

        let tls = match (non_empty(vars::TLS_CERT_FILE), non_empty(vars::TLS_KEY_FILE)) {
            (Some(cert), Some(key)) => Some(TlsFiles {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => bail!("TLS_CERT_FILE and TLS_KEY_FILE must be set together"),
        };

        Ok(Config {
            group_name,
            solver_name,
            listen_address,
            tls,
            kubeconfig_path: non_empty(vars::KUBECONFIG_PATH).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_group_name_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("GROUP_NAME"));

        assert!(load(&[("GROUP_NAME", "")]).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("GROUP_NAME", "acme.example.com")]).unwrap();

        assert_eq!(config.group_name, "acme.example.com");
        assert_eq!(config.solver_name, "lego");
        assert_eq!(config.listen_address, "0.0.0.0:8443".parse().unwrap());
        assert!(config.tls.is_none());
        assert!(config.kubeconfig_path.is_none());
    }

    #[test]
    fn test_explicit_values() {
        let config = load(&[
            ("GROUP_NAME", "acme.example.com"),
            ("SOLVER_NAME", "dns"),
            ("LISTEN_ADDRESS", "127.0.0.1:9443"),
            ("TLS_CERT_FILE", "/tls/tls.crt"),
            ("TLS_KEY_FILE", "/tls/tls.key"),
            ("KUBECONFIG_PATH", "/etc/kube/config"),
        ])
        .unwrap();

        assert_eq!(config.solver_name, "dns");
        assert_eq!(config.listen_address.port(), 9443);
        assert_eq!(
            config.tls,
            Some(TlsFiles {
                cert: "/tls/tls.crt".into(),
                key: "/tls/tls.key".into(),
            })
        );
        assert_eq!(config.kubeconfig_path, Some(PathBuf::from("/etc/kube/config")));
    }

    #[test]
    fn test_tls_files_must_be_paired() {
        assert!(load(&[("GROUP_NAME", "g"), ("TLS_CERT_FILE", "/tls/tls.crt")]).is_err());
        assert!(load(&[("GROUP_NAME", "g"), ("TLS_KEY_FILE", "/tls/tls.key")]).is_err());
    }

    #[test]
    fn test_invalid_listen_address() {
        assert!(load(&[("GROUP_NAME", "g"), ("LISTEN_ADDRESS", "not-an-address")]).is_err());
    }
}
