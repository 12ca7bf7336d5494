// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret and ConfigMap key lookups scoped to a namespace

use crate::error::{LegateError, Result};
use k8s_openapi::api::core::v1::{ConfigMap, ConfigMapKeySelector, Secret, SecretKeySelector};
use kube::{Api, Client};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

const SECRET: &str = "Secret";
const CONFIG_MAP: &str = "ConfigMap";

/// Read a single key of a Secret as a UTF-8 string
#[instrument(skip(client, selector), fields(secret = %selector.name, key = %selector.key))]
pub async fn secret_value(
    client: &Client,
    namespace: &str,
    selector: &SecretKeySelector,
) -> Result<String> {
    if selector.name.is_empty() {
        return Err(LegateError::MissingReferenceName {
            kind: SECRET,
            selector: "secretKeyRef",
        });
    }

    let secret = get_secret(client, namespace, &selector.name).await?;

    let Some(bytes) = secret.data.as_ref().and_then(|d| d.get(&selector.key)) else {
        return Err(LegateError::KeyNotFound {
            kind: SECRET,
            namespace: namespace.to_string(),
            name: selector.name.clone(),
            key: selector.key.clone(),
        });
    };

    String::from_utf8(bytes.0.clone()).map_err(|_| LegateError::InvalidValue {
        kind: SECRET,
        namespace: namespace.to_string(),
        name: selector.name.clone(),
        key: selector.key.clone(),
    })
}

/// Read a single key of a ConfigMap
#[instrument(skip(client, selector), fields(config_map = %selector.name, key = %selector.key))]
pub async fn config_map_value(
    client: &Client,
    namespace: &str,
    selector: &ConfigMapKeySelector,
) -> Result<String> {
    if selector.name.is_empty() {
        return Err(LegateError::MissingReferenceName {
            kind: CONFIG_MAP,
            selector: "configMapKeyRef",
        });
    }

    let config_map = get_config_map(client, namespace, &selector.name).await?;

    config_map
        .data
        .as_ref()
        .and_then(|d| d.get(&selector.key))
        .cloned()
        .ok_or_else(|| LegateError::KeyNotFound {
            kind: CONFIG_MAP,
            namespace: namespace.to_string(),
            name: selector.name.clone(),
            key: selector.key.clone(),
        })
}

/// All keys of a Secret; keys whose value is not UTF-8 are skipped
#[instrument(skip(client))]
pub async fn secret_data(client: &Client, namespace: &str, name: &str) -> Result<BTreeMap<String, String>> {
    if name.is_empty() {
        return Err(LegateError::MissingReferenceName {
            kind: SECRET,
            selector: "secretRef",
        });
    }

    let secret = get_secret(client, namespace, name).await?;

    Ok(secret
        .data
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, bytes)| match String::from_utf8(bytes.0) {
            Ok(value) => Some((key, value)),
            Err(_) => {
                warn!("Skipping key {:?} of secret '{}/{}': not valid UTF-8", key, namespace, name);
                None
            }
        })
        .collect())
}

/// All keys of a ConfigMap's `data`
#[instrument(skip(client))]
pub async fn config_map_data(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<BTreeMap<String, String>> {
    if name.is_empty() {
        return Err(LegateError::MissingReferenceName {
            kind: CONFIG_MAP,
            selector: "configMapRef",
        });
    }

    Ok(get_config_map(client, namespace, name)
        .await?
        .data
        .unwrap_or_default())
}

/// True when the error means the referenced object or key does not exist
pub fn is_not_found(error: &LegateError) -> bool {
    match error {
        LegateError::KubeError(kube::Error::Api(err)) => err.code == 404,
        LegateError::KeyNotFound { .. } => true,
        _ => false,
    }
}

async fn get_secret(client: &Client, namespace: &str, name: &str) -> Result<Secret> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    debug!("Getting secret '{}/{}'", namespace, name);
    Ok(secrets.get(name).await?)
}

async fn get_config_map(client: &Client, namespace: &str, name: &str) -> Result<ConfigMap> {
    let config_maps: Api<ConfigMap> = Api::namespaced(client.clone(), namespace);
    debug!("Getting configmap '{}/{}'", namespace, name);
    Ok(config_maps.get(name).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{config_map_json, not_found_json, secret_json, MockService};

    fn selector(name: &str, key: &str) -> SecretKeySelector {
        SecretKeySelector {
            name: name.to_string(),
            key: key.to_string(),
            optional: None,
        }
    }

    fn cm_selector(name: &str, key: &str) -> ConfigMapKeySelector {
        ConfigMapKeySelector {
            name: name.to_string(),
            key: key.to_string(),
            optional: None,
        }
    }

    fn client() -> Client {
        MockService::new()
            .on_get(
                "/api/v1/namespaces/dns/secrets/cloudflare",
                200,
                &secret_json("dns", "cloudflare", &[("token", "s3cr3t"), ("email", "ops@example.com")]),
            )
            .on_get(
                "/api/v1/namespaces/dns/configmaps/settings",
                200,
                &config_map_json("dns", "settings", &[("ttl", "300")]),
            )
            .into_client()
    }

    #[tokio::test]
    async fn test_secret_value() {
        let value = secret_value(&client(), "dns", &selector("cloudflare", "token"))
            .await
            .unwrap();
        assert_eq!(value, "s3cr3t");
    }

    #[tokio::test]
    async fn test_secret_missing_key() {
        let err = secret_value(&client(), "dns", &selector("cloudflare", "nope"))
            .await
            .unwrap_err();
        assert!(is_not_found(&err));
        assert_eq!(
            err.to_string(),
            "key not found \"nope\" in Secret 'dns/cloudflare'"
        );
    }

    #[tokio::test]
    async fn test_secret_missing_object() {
        let client = MockService::new()
            .on_get(
                "/api/v1/namespaces/dns/secrets/absent",
                404,
                &not_found_json("secrets", "absent"),
            )
            .into_client();

        let err = secret_value(&client, "dns", &selector("absent", "token"))
            .await
            .unwrap_err();
        assert!(matches!(err, LegateError::KubeError(_)));
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_secret_name_required() {
        let err = secret_value(&client(), "dns", &selector("", "token"))
            .await
            .unwrap_err();
        assert!(matches!(err, LegateError::MissingReferenceName { .. }));
        assert!(!is_not_found(&err));
    }

    #[tokio::test]
    async fn test_config_map_value() {
        let value = config_map_value(&client(), "dns", &cm_selector("settings", "ttl"))
            .await
            .unwrap();
        assert_eq!(value, "300");

        let err = config_map_value(&client(), "dns", &cm_selector("settings", "zone"))
            .await
            .unwrap_err();
        assert!(matches!(err, LegateError::KeyNotFound { kind: "ConfigMap", .. }));
    }

    #[tokio::test]
    async fn test_secret_data() {
        let data = secret_data(&client(), "dns", "cloudflare").await.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["email"], "ops@example.com");
    }

    #[tokio::test]
    async fn test_config_map_data() {
        let data = config_map_data(&client(), "dns", "settings").await.unwrap();
        assert_eq!(data.get("ttl").map(String::as_str), Some("300"));

        let err = config_map_data(&client(), "dns", "missing").await.unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_lookups_scoped_to_namespace() {
        let service = MockService::new();
        let client = service.clone().into_client();

        let err = secret_value(&client, "team-a", &selector("cloudflare", "token"))
            .await
            .unwrap_err();
        assert!(is_not_found(&err));
        assert_eq!(
            service.requested_paths(),
            vec!["/api/v1/namespaces/team-a/secrets/cloudflare"]
        );
    }
}
