// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Turns env declarations into literal values, following Secret and
//! ConfigMap references in the request namespace.

use crate::env::expansion::expand;
use crate::error::{LegateError, Result};
use crate::kubernetes::lookup::{
    config_map_data, config_map_value, is_not_found, secret_data, secret_value,
};
use crate::types::{unsupported_reference_kind, ProviderConfig};
use k8s_openapi::api::core::v1::{EnvFromSource, EnvVar};
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error, instrument, warn};

pub struct EnvResolver {
    client: Option<Client>,
}

impl EnvResolver {
    /// A resolver without a client fails every reference lookup with `NotInitialized`
    pub fn new(client: Option<Client>) -> Self {
        Self { client }
    }

    /// Resolve `envFrom` then `env`, in declaration order.
    ///
    /// Later declarations override earlier ones with the same name. Lookup
    /// failures degrade to an empty value unless `strict` is set on the
    /// config and the reference isn't optional.
    #[instrument(skip(self, config), fields(provider = %config.provider))]
    pub async fn resolve(&self, config: &ProviderConfig, namespace: &str) -> Result<Vec<EnvVar>> {
        let mut resolved = Vec::new();

        for source in &config.env_from {
            resolved.extend(self.resolve_env_from(source, namespace, config.strict).await?);
        }

        let env_vars = self.resolve_env_vars(config, &resolved, namespace).await?;
        resolved.extend(env_vars);

        Ok(dedup_keep_last(resolved))
    }

    /// Replace every `env` declaration's value with its literal value.
    ///
    /// `preceding` holds variables already resolved, visible to `$(VAR)`
    /// expansion when the config enables it.
    pub async fn resolve_env_vars(
        &self,
        config: &ProviderConfig,
        preceding: &[EnvVar],
        namespace: &str,
    ) -> Result<Vec<EnvVar>> {
        let mut known: HashMap<String, String> = preceding
            .iter()
            .map(|v| (v.name.clone(), v.value.clone().unwrap_or_default()))
            .collect();
        let mut resolved = Vec::with_capacity(config.env_vars.len());

        for env_var in &config.env_vars {
            let value = match self
                .resolve_one(env_var, &known, namespace, config.expand_vars)
                .await
            {
                Ok(value) => value,
                Err(Failure { error, optional }) => {
                    if config.strict && !optional {
                        error!("Failed to resolve env var {}: {}", env_var.name, error);
                        return Err(error);
                    }
                    if optional {
                        debug!(
                            "Optional reference for env var {} not resolved: {}",
                            env_var.name, error
                        );
                    } else {
                        error!(
                            "Failed to resolve env var {}: {}. Continuing with \"\" as value",
                            env_var.name, error
                        );
                    }
                    String::new()
                }
            };

            known.insert(env_var.name.clone(), value.clone());
            resolved.push(EnvVar {
                name: env_var.name.clone(),
                value: Some(value),
                value_from: None,
            });
        }

        Ok(resolved)
    }

    async fn resolve_one(
        &self,
        env_var: &EnvVar,
        known: &HashMap<String, String>,
        namespace: &str,
        expand_vars: bool,
    ) -> std::result::Result<String, Failure> {
        if let Some(value) = env_var.value.as_deref().filter(|v| !v.is_empty()) {
            if expand_vars {
                return Ok(expand(value, |name| known.get(name).cloned()));
            }
            return Ok(value.to_string());
        }

        let Some(source) = env_var.value_from.as_ref() else {
            return Ok(String::new());
        };

        if let Some(selector) = &source.config_map_key_ref {
            let client = self.client().map_err(Failure::required)?;
            return config_map_value(client, namespace, selector)
                .await
                .map_err(|e| Failure::for_reference(e, selector.optional.unwrap_or(false)));
        }

        if let Some(selector) = &source.secret_key_ref {
            let client = self.client().map_err(Failure::required)?;
            return secret_value(client, namespace, selector)
                .await
                .map_err(|e| Failure::for_reference(e, selector.optional.unwrap_or(false)));
        }

        Err(Failure::required(LegateError::UnsupportedReference(
            unsupported_reference_kind(source).to_string(),
        )))
    }

    async fn resolve_env_from(
        &self,
        source: &EnvFromSource,
        namespace: &str,
        strict: bool,
    ) -> Result<Vec<EnvVar>> {
        let mut resolved = Vec::new();
        let prefix = source.prefix.as_deref().unwrap_or_default();

        if let Some(selector) = &source.config_map_ref {
            let data = match self.client() {
                Ok(client) => config_map_data(client, namespace, &selector.name).await,
                Err(e) => Err(e),
            };
            resolved.extend(prefixed(data, prefix, &selector.name, selector.optional.unwrap_or(false), strict)?);
        }

        if let Some(selector) = &source.secret_ref {
            let data = match self.client() {
                Ok(client) => secret_data(client, namespace, &selector.name).await,
                Err(e) => Err(e),
            };
            resolved.extend(prefixed(data, prefix, &selector.name, selector.optional.unwrap_or(false), strict)?);
        }

        Ok(resolved)
    }

    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or(LegateError::NotInitialized)
    }
}

fn prefixed(
    data: Result<BTreeMap<String, String>>,
    prefix: &str,
    object: &str,
    optional: bool,
    strict: bool,
) -> Result<Vec<EnvVar>> {
    let data = match data {
        Ok(data) => data,
        Err(e) if optional && is_not_found(&e) => {
            debug!("Optional envFrom source {} not found: {}", object, e);
            return Ok(Vec::new());
        }
        Err(e) if strict => {
            error!("Failed to resolve envFrom source {}: {}", object, e);
            return Err(e);
        }
        Err(e) => {
            error!("Failed to resolve envFrom source {}: {}. Skipping it", object, e);
            return Ok(Vec::new());
        }
    };

    Ok(data
        .into_iter()
        .filter_map(|(key, value)| {
            let name = format!("{}{}", prefix, key);
            if !is_valid_env_name(&name) {
                warn!("Skipping key {:?} of {}: {:?} is not a valid variable name", key, object, name);
                return None;
            }
            Some(EnvVar {
                name,
                value: Some(value),
                value_from: None,
            })
        })
        .collect())
}

/// A lookup error together with whether the reference was marked optional
struct Failure {
    error: LegateError,
    optional: bool,
}

impl Failure {
    fn required(error: LegateError) -> Self {
        Failure {
            error,
            optional: false,
        }
    }

    /// Only a missing object or key is excused by `optional`
    fn for_reference(error: LegateError, optional: bool) -> Self {
        let optional = optional && is_not_found(&error);
        Failure { error, optional }
    }
}

fn is_valid_env_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('=') && name.chars().all(|c| c.is_ascii_graphic())
}

fn dedup_keep_last(vars: Vec<EnvVar>) -> Vec<EnvVar> {
    let mut last_index: HashMap<String, usize> = HashMap::new();
    for (i, v) in vars.iter().enumerate() {
        last_index.insert(v.name.clone(), i);
    }
    vars.into_iter()
        .enumerate()
        .filter(|(i, v)| last_index.get(&v.name) == Some(i))
        .map(|(_, v)| v)
        .collect()
}
