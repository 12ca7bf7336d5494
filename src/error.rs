// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LegateError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Error decoding solver config: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    #[error("{0} as env reference is not implemented (only configMapKeyRef and secretKeyRef are supported)")]
    UnsupportedReference(String),

    #[error("{kind} name not present in {selector}")]
    MissingReferenceName {
        kind: &'static str,
        selector: &'static str,
    },

    #[error("key not found {key:?} in {kind} '{namespace}/{name}'")]
    KeyNotFound {
        kind: &'static str,
        namespace: String,
        name: String,
        key: String,
    },

    #[error("Value of key {key:?} in {kind} '{namespace}/{name}' is not valid UTF-8")]
    InvalidValue {
        kind: &'static str,
        namespace: String,
        name: String,
        key: String,
    },

    #[error("Solver has not been initialized with a Kubernetes client")]
    NotInitialized,

    #[error("Invalid resolved FQDN: {0:?}")]
    InvalidFqdn(String),

    #[error("Unrecognized DNS provider: {0:?}")]
    UnknownProvider(String),

    #[error("Provider {provider}: missing credentials: {}", .names.join(","))]
    MissingCredentials {
        provider: &'static str,
        names: Vec<String>,
    },

    #[error("Provider {provider}: invalid configuration: {message}")]
    ProviderConfig {
        provider: &'static str,
        message: String,
    },

    #[error("Provider {provider}: {message}")]
    ProviderFailure {
        provider: &'static str,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS configuration error: {0}")]
    Tls(String),
}

pub type Result<T> = std::result::Result<T, LegateError>;
