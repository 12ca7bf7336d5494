// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-request credential scope handed to DNS providers.

use crate::constants::FILE_ENV_SUFFIX;
use crate::error::{LegateError, Result};
use k8s_openapi::api::core::v1::EnvVar;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Resolved variables for a single challenge request.
///
/// Providers read their settings from here instead of the process
/// environment, so concurrent requests never see each other's values.
/// Dropping the scope discards them.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
    allow_ambient: bool,
}

impl Credentials {
    pub fn new(vars: impl IntoIterator<Item = (String, String)>, allow_ambient: bool) -> Self {
        Self {
            vars: vars.into_iter().collect(),
            allow_ambient,
        }
    }

    pub fn from_env_vars(env_vars: &[EnvVar], allow_ambient: bool) -> Self {
        Self::new(
            env_vars
                .iter()
                .map(|v| (v.name.clone(), v.value.clone().unwrap_or_default())),
            allow_ambient,
        )
    }

    /// Read every `<name>_FILE` indirection into `<name>`.
    ///
    /// Resolved `_FILE` variables are read first, then ambient ones when
    /// allowed. A `<name>` that already holds a resolved value is left alone.
    /// Unreadable or empty files leave `<name>` unset.
    pub async fn load_files(mut self) -> Self {
        let mut candidates: Vec<(String, String)> = self
            .vars
            .iter()
            .filter_map(|(k, v)| file_target(k).map(|name| (name.to_string(), v.clone())))
            .collect();
        if self.allow_ambient {
            candidates.extend(
                std::env::vars()
                    .filter_map(|(k, v)| file_target(&k).map(|name| (name.to_string(), v))),
            );
        }

        for (name, path) in candidates {
            if path.is_empty() || self.vars.get(&name).is_some_and(|v| !v.is_empty()) {
                continue;
            }
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => {
                    let value = contents.trim();
                    if !value.is_empty() {
                        self.vars.insert(name, value.to_string());
                    }
                }
                Err(e) => warn!("Failed to read {} from {}: {}", name, path, e),
            }
        }
        self
    }

    /// Look up a value: the resolved variable, then the process environment
    /// when ambient credentials are allowed. Empty values count as unset.
    pub fn get(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
            .or_else(|| self.ambient(name))
    }

    /// First of several alias names that has a value
    pub fn get_one_of(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.get(name))
    }

    /// Like `get_one_of`, failing with the full alias list when none is set
    pub fn require_one_of(&self, provider: &'static str, names: &[&str]) -> Result<String> {
        self.get_one_of(names)
            .ok_or_else(|| LegateError::MissingCredentials {
                provider,
                names: names.iter().map(|n| n.to_string()).collect(),
            })
    }

    /// Variables resolved for this request, for handing to a child process
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    fn ambient(&self, name: &str) -> Option<String> {
        if !self.allow_ambient {
            return None;
        }
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

fn file_target(name: &str) -> Option<&str> {
    name.strip_suffix(FILE_ENV_SUFFIX).filter(|n| !n.is_empty())
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("names", &self.vars.keys().collect::<Vec<_>>())
            .field("allow_ambient", &self.allow_ambient)
            .finish()
    }
}
