// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Environment variables read at startup
pub mod env {
    /// API group the webhook is registered under (required)
    pub const GROUP_NAME: &str = "GROUP_NAME";
    /// Name of the solver within the group
    pub const SOLVER_NAME: &str = "SOLVER_NAME";
    /// Socket address the webhook server binds to
    pub const LISTEN_ADDRESS: &str = "LISTEN_ADDRESS";
    /// PEM certificate chain served by the webhook
    pub const TLS_CERT_FILE: &str = "TLS_CERT_FILE";
    /// PEM private key matching the certificate chain
    pub const TLS_KEY_FILE: &str = "TLS_KEY_FILE";
    /// Explicit kubeconfig file, overrides in-cluster/default inference
    pub const KUBECONFIG_PATH: &str = "KUBECONFIG_PATH";
}

pub const DEFAULT_SOLVER_NAME: &str = "lego";
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8443";

/// cert-manager webhook API coordinates
pub mod webhook {
    pub const API_VERSION: &str = "v1alpha1";
    pub const PAYLOAD_API_VERSION: &str = "webhook.acme.cert-manager.io/v1alpha1";
    pub const PAYLOAD_KIND: &str = "ChallengePayload";
    /// Largest request body accepted on the challenge endpoint
    pub const MAX_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;
}

/// DNS-01 record naming
pub mod dns01 {
    pub const CHALLENGE_LABEL: &str = "_acme-challenge";
}

/// Suffix marking a credential whose value lives in a file
pub const FILE_ENV_SUFFIX: &str = "_FILE";
