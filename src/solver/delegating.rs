// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Solver that resolves the issuer's credential declarations and hands the
//! record work to a named DNS provider.

use crate::env::{Credentials, EnvResolver};
use crate::error::Result;
use crate::providers::dns01::strip_challenge_label;
use crate::providers::{DnsProvider, ProviderRegistry};
use crate::solver::Solver;
use crate::types::{ChallengeAction, ChallengeRequest, ProviderConfig};
use async_trait::async_trait;
use kube::Client;
use tracing::{debug, error, info, instrument};

pub struct DelegatingSolver {
    name: String,
    registry: ProviderRegistry,
    resolver: EnvResolver,
}

/// Everything needed to run one action against the provider
struct Prepared {
    provider: Box<dyn DnsProvider>,
    provider_name: String,
    domain: String,
}

impl DelegatingSolver {
    pub fn new(name: &str, registry: ProviderRegistry) -> Self {
        Self {
            name: name.to_string(),
            registry,
            resolver: EnvResolver::new(None),
        }
    }

    /// Decode the config, resolve credentials and build the provider.
    ///
    /// The credential scope only lives for the provider's construction; the
    /// process environment is never touched.
    async fn prepare(&self, request: &ChallengeRequest) -> Result<Prepared> {
        let config = ProviderConfig::decode(request.config.as_ref())?;

        let env_vars = self
            .resolver
            .resolve(&config, &request.resource_namespace)
            .await?;
        let credentials = Credentials::from_env_vars(&env_vars, request.allow_ambient_credentials)
            .load_files()
            .await;
        debug!(
            "Resolved {} variables for provider {:?}",
            credentials.len(),
            config.provider
        );

        // Providers add the _acme-challenge label back themselves
        let domain = strip_challenge_label(&request.resolved_fqdn)?.to_string();

        let provider = self
            .registry
            .build(&config.provider, &credentials)
            .inspect_err(|e| {
                error!("Failed to load DNS provider {:?}: {}", config.provider, e);
            })?;

        Ok(Prepared {
            provider,
            provider_name: config.provider,
            domain,
        })
    }

    #[instrument(
        skip(self, request),
        fields(uid = %request.uid, dns_name = %request.dns_name, namespace = %request.resource_namespace)
    )]
    async fn delegate(&self, action: ChallengeAction, request: &ChallengeRequest) -> Result<()> {
        let prepared = self.prepare(request).await?;
        let key = request.key_material();

        info!(
            "Delegating {} to provider {} for {} (resolved {})",
            action, prepared.provider_name, request.dns_name, prepared.domain
        );

        let result = match action {
            ChallengeAction::Present => {
                prepared
                    .provider
                    .present(&prepared.domain, &request.token, &key)
                    .await
            }
            ChallengeAction::CleanUp => {
                prepared
                    .provider
                    .clean_up(&prepared.domain, &request.token, &key)
                    .await
            }
        };

        if let Err(e) = &result {
            error!("{} failed for {}: {}", action, prepared.domain, e);
        }
        result
    }
}

#[async_trait]
impl Solver for DelegatingSolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&mut self, client: Client) -> Result<()> {
        self.resolver = EnvResolver::new(Some(client));
        info!("Initialized kubernetes client for solver {}", self.name);
        Ok(())
    }

    async fn present(&self, request: &ChallengeRequest) -> Result<()> {
        self.delegate(ChallengeAction::Present, request).await
    }

    async fn clean_up(&self, request: &ChallengeRequest) -> Result<()> {
        self.delegate(ChallengeAction::CleanUp, request).await
    }
}
