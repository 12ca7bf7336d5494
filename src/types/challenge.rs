// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! cert-manager webhook wire types (`webhook.acme.cert-manager.io/v1alpha1`).

use crate::constants::webhook::{PAYLOAD_API_VERSION, PAYLOAD_KIND};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Envelope exchanged with cert-manager for every challenge operation
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

impl ChallengePayload {
    /// Attach a response, filling in the type metadata if the caller left it out
    pub fn respond(mut self, response: ChallengeResponse) -> Self {
        if self.api_version.is_empty() {
            self.api_version = PAYLOAD_API_VERSION.to_string();
        }
        if self.kind.is_empty() {
            self.kind = PAYLOAD_KIND.to_string();
        }
        self.response = Some(response);
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChallengeAction {
    Present,
    CleanUp,
}

impl fmt::Display for ChallengeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeAction::Present => f.write_str("Present"),
            ChallengeAction::CleanUp => f.write_str("CleanUp"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[serde(default)]
    pub uid: String,
    pub action: ChallengeAction,
    #[serde(rename = "type", default)]
    pub challenge_type: String,
    #[serde(default)]
    pub dns_name: String,
    /// ACME challenge token, sent by controllers that expose it
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    /// TXT record value, already digested by cert-manager
    #[serde(default)]
    pub key: String,
    /// Key authorization before digesting, when the controller provides it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_hash_key: Option<String>,
    #[serde(default)]
    pub resource_namespace: String,
    #[serde(rename = "resolvedFQDN", default)]
    pub resolved_fqdn: String,
    #[serde(default)]
    pub resolved_zone: String,
    #[serde(default)]
    pub allow_ambient_credentials: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl ChallengeRequest {
    pub fn key_material(&self) -> KeyMaterial {
        match self.pre_hash_key.as_deref() {
            Some(auth) if !auth.is_empty() => KeyMaterial::Authorization(auth.to_string()),
            _ => KeyMaterial::Digest(self.key.clone()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    #[serde(default)]
    pub uid: String,
    pub success: bool,
    #[serde(rename = "status", default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Status>,
}

impl ChallengeResponse {
    pub fn success(uid: &str) -> Self {
        ChallengeResponse {
            uid: uid.to_string(),
            success: true,
            result: None,
        }
    }

    pub fn failure(uid: &str, message: String) -> Self {
        ChallengeResponse {
            uid: uid.to_string(),
            success: false,
            result: Some(Status {
                status: Some("Failure".to_string()),
                message: Some(message),
                reason: Some("InternalError".to_string()),
                code: Some(500),
                ..Default::default()
            }),
        }
    }
}

/// Key material a provider publishes for a DNS-01 challenge
#[derive(Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// Raw key authorization (`token.thumbprint`)
    Authorization(String),
    /// Pre-computed TXT record value
    Digest(String),
}

impl KeyMaterial {
    /// Value of the `_acme-challenge` TXT record
    pub fn txt_value(&self) -> String {
        match self {
            KeyMaterial::Authorization(auth) => {
                URL_SAFE_NO_PAD.encode(Sha256::digest(auth.as_bytes()))
            }
            KeyMaterial::Digest(value) => value.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            KeyMaterial::Authorization(s) | KeyMaterial::Digest(s) => s,
        }
    }
}

// Key authorizations are credentials of their own, keep them out of logs.
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Authorization(_) => f.write_str("Authorization(..)"),
            KeyMaterial::Digest(value) => f.debug_tuple("Digest").field(value).finish(),
        }
    }
}
