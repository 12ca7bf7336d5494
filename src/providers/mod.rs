// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! DNS providers that publish and remove DNS-01 TXT records.

pub mod cloudflare;
pub mod dns01;
pub mod exec;
pub mod httpreq;

use crate::env::Credentials;
use crate::error::{LegateError, Result};
use crate::types::KeyMaterial;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

pub use cloudflare::CloudflareProvider;
pub use exec::ExecProvider;
pub use httpreq::HttpReqProvider;

/// A DNS backend able to solve DNS-01 challenges.
///
/// `domain` is the name being validated, without the `_acme-challenge`
/// label; providers add it themselves through [`dns01::challenge_fqdn`].
/// Both operations must tolerate being repeated with the same arguments.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    async fn present(&self, domain: &str, token: &str, key: &KeyMaterial) -> Result<()>;

    /// Remove only the record carrying this `key`, other validations of the
    /// same name may be in flight
    async fn clean_up(&self, domain: &str, token: &str, key: &KeyMaterial) -> Result<()>;
}

pub type ProviderFactory =
    Arc<dyn Fn(&Credentials) -> Result<Box<dyn DnsProvider>> + Send + Sync>;

/// Named provider constructors
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Registry with no providers, see [`ProviderRegistry::with_defaults`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider
    pub fn with_defaults() -> Self {
        Self::new()
            .register(cloudflare::NAME, |creds| {
                Ok(Box::new(CloudflareProvider::from_credentials(creds)?))
            })
            .register(exec::NAME, |creds| {
                Ok(Box::new(ExecProvider::from_credentials(creds)?))
            })
            .register(httpreq::NAME, |creds| {
                Ok(Box::new(HttpReqProvider::from_credentials(creds)?))
            })
    }

    pub fn register<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&Credentials) -> Result<Box<dyn DnsProvider>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
        self
    }

    /// Construct provider `name` from the request's credentials
    pub fn build(&self, name: &str, credentials: &Credentials) -> Result<Box<dyn DnsProvider>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| LegateError::UnknownProvider(name.to_string()))?;
        factory(credentials)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
