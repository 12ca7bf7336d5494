// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-issuer solver configuration, taken from
//! `issuer.spec.acme.solvers[].dns01.webhook.config`.
//!
//! Declarations use the container `EnvVar`/`EnvFromSource` shapes from core/v1.

use crate::error::Result;
use k8s_openapi::api::core::v1::{EnvFromSource, EnvVar, EnvVarSource};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// DNS provider name, as known by the provider registry
    #[serde(default)]
    pub provider: String,
    /// Fail the request instead of substituting "" when a reference can't be resolved
    #[serde(default)]
    pub strict: bool,
    /// Apply `$(VAR)` expansion to literal values. Off by default, literals
    /// are passed through byte for byte.
    #[serde(default)]
    pub expand_vars: bool,
    #[serde(default, rename = "env", skip_serializing_if = "Vec::is_empty")]
    pub env_vars: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_from: Vec<EnvFromSource>,
}

impl ProviderConfig {
    /// Decode the raw request config; a missing or null config yields the default
    pub fn decode(raw: Option<&serde_json::Value>) -> Result<Self> {
        match raw {
            None | Some(serde_json::Value::Null) => Ok(ProviderConfig::default()),
            Some(value) => Ok(ProviderConfig::deserialize(value)?),
        }
    }
}

/// Name of the reference kind set on `source` that can't be resolved here
pub fn unsupported_reference_kind(source: &EnvVarSource) -> &'static str {
    if source.field_ref.is_some() {
        "fieldRef"
    } else if source.resource_field_ref.is_some() {
        "resourceFieldRef"
    } else {
        "empty valueFrom"
    }
}
