// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cloudflare DNS provider (API v4).

use crate::env::Credentials;
use crate::error::{LegateError, Result};
use crate::providers::dns01::{challenge_fqdn, un_fqdn};
use crate::providers::DnsProvider;
use crate::types::KeyMaterial;
use async_trait::async_trait;
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub const NAME: &str = "cloudflare";

const ENV_DNS_API_TOKEN: &[&str] = &["CF_DNS_API_TOKEN", "CLOUDFLARE_DNS_API_TOKEN"];
const ENV_ZONE_API_TOKEN: &[&str] = &["CF_ZONE_API_TOKEN", "CLOUDFLARE_ZONE_API_TOKEN"];
const ENV_EMAIL: &[&str] = &["CF_API_EMAIL", "CLOUDFLARE_EMAIL"];
const ENV_API_KEY: &[&str] = &["CF_API_KEY", "CLOUDFLARE_API_KEY"];
const ENV_TTL: &str = "CLOUDFLARE_TTL";
const ENV_HTTP_TIMEOUT: &str = "CLOUDFLARE_HTTP_TIMEOUT";

const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
const DEFAULT_TTL: u32 = 120;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Cloudflare rejects a second identical record with this code
const RECORD_ALREADY_EXISTS: i64 = 81057;

#[derive(Clone)]
enum Auth {
    Token(String),
    Key { email: String, key: String },
}

impl Auth {
    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Auth::Token(token) => request.bearer_auth(token),
            Auth::Key { email, key } => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", key),
        }
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<T>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct Zone {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct DnsRecord {
    id: String,
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
struct NewTxtRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
}

pub struct CloudflareProvider {
    client: reqwest::Client,
    base_url: String,
    dns_auth: Auth,
    zone_auth: Auth,
    ttl: u32,
}

impl CloudflareProvider {
    pub fn from_credentials(creds: &Credentials) -> Result<Self> {
        let dns_auth = match creds.get_one_of(ENV_DNS_API_TOKEN) {
            Some(token) => Auth::Token(token),
            None => match (creds.get_one_of(ENV_EMAIL), creds.get_one_of(ENV_API_KEY)) {
                (Some(email), Some(key)) => Auth::Key { email, key },
                _ => {
                    return Err(LegateError::MissingCredentials {
                        provider: NAME,
                        names: [ENV_DNS_API_TOKEN, ENV_EMAIL, ENV_API_KEY]
                            .concat()
                            .iter()
                            .map(|n| n.to_string())
                            .collect(),
                    })
                }
            },
        };
        let zone_auth = creds
            .get_one_of(ENV_ZONE_API_TOKEN)
            .map(Auth::Token)
            .unwrap_or_else(|| dns_auth.clone());

        let ttl = match creds.get(ENV_TTL) {
            None => DEFAULT_TTL,
            Some(raw) => raw.parse().map_err(|_| LegateError::ProviderConfig {
                provider: NAME,
                message: format!("{} must be a number, got {:?}", ENV_TTL, raw),
            })?,
        };
        let timeout = match creds.get(ENV_HTTP_TIMEOUT) {
            None => DEFAULT_HTTP_TIMEOUT_SECS,
            Some(raw) => raw.parse().map_err(|_| LegateError::ProviderConfig {
                provider: NAME,
                message: format!("{} must be a number of seconds, got {:?}", ENV_HTTP_TIMEOUT, raw),
            })?,
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            dns_auth,
            zone_auth,
            ttl,
        })
    }

    /// Point the provider at another API root
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Find the zone hosting `domain` by trying each parent name, longest first
    #[instrument(skip(self))]
    async fn find_zone(&self, domain: &str) -> Result<Zone> {
        let domain = un_fqdn(domain);
        let labels: Vec<&str> = domain.split('.').collect();

        for start in 0..labels.len().saturating_sub(1) {
            let candidate = labels[start..].join(".");
            let request = self
                .client
                .get(format!("{}/zones", self.base_url))
                .query(&[("name", candidate.as_str())]);
            let zones: Vec<Zone> = self.call(&self.zone_auth, request).await?;

            if let Some(zone) = zones.into_iter().next() {
                debug!("Zone for {} is {} ({})", domain, zone.name, zone.id);
                return Ok(zone);
            }
        }

        Err(LegateError::ProviderFailure {
            provider: NAME,
            message: format!("no zone found for {}", domain),
        })
    }

    async fn txt_records(&self, zone: &Zone, name: &str) -> Result<Vec<DnsRecord>> {
        let request = self
            .client
            .get(format!("{}/zones/{}/dns_records", self.base_url, zone.id))
            .query(&[("type", "TXT"), ("name", name)]);
        self.call(&self.dns_auth, request).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        auth: &Auth,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = auth.apply(request).send().await?;
        let status = response.status();
        let envelope: Envelope<T> = response.json().await.map_err(|e| LegateError::ProviderFailure {
            provider: NAME,
            message: format!("unexpected response ({}): {}", status, e),
        })?;

        match envelope.result {
            Some(result) if envelope.success && status.is_success() => Ok(result),
            _ => Err(api_failure(status, &envelope.errors)),
        }
    }
}

fn api_failure(status: reqwest::StatusCode, errors: &[ApiError]) -> LegateError {
    let details = errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    LegateError::ProviderFailure {
        provider: NAME,
        message: format!("API returned {}: {}", status, details),
    }
}

impl fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn present(&self, domain: &str, _token: &str, key: &KeyMaterial) -> Result<()> {
        let zone = self.find_zone(domain).await?;
        let fqdn = challenge_fqdn(domain);
        let name = un_fqdn(&fqdn);
        let value = key.txt_value();

        let record = NewTxtRecord {
            record_type: "TXT",
            name,
            content: &value,
            ttl: self.ttl,
        };
        let request = self
            .client
            .post(format!("{}/zones/{}/dns_records", self.base_url, zone.id))
            .json(&record);

        let response = self.dns_auth.apply(request).send().await?;
        let status = response.status();
        let envelope: Envelope<serde_json::Value> =
            response.json().await.map_err(|e| LegateError::ProviderFailure {
                provider: NAME,
                message: format!("unexpected response ({}): {}", status, e),
            })?;

        if envelope.success && status.is_success() {
            info!("Created TXT record {} in zone {}", name, zone.name);
            return Ok(());
        }
        if envelope.errors.iter().any(|e| e.code == RECORD_ALREADY_EXISTS) {
            debug!("TXT record {} already present", name);
            return Ok(());
        }
        Err(api_failure(status, &envelope.errors))
    }

    async fn clean_up(&self, domain: &str, _token: &str, key: &KeyMaterial) -> Result<()> {
        let zone = self.find_zone(domain).await?;
        let fqdn = challenge_fqdn(domain);
        let name = un_fqdn(&fqdn);
        let value = key.txt_value();

        let matching: Vec<DnsRecord> = self
            .txt_records(&zone, name)
            .await?
            .into_iter()
            .filter(|r| r.content.trim_matches('"') == value)
            .collect();

        if matching.is_empty() {
            debug!("No TXT record {} with the challenge value, nothing to clean up", name);
            return Ok(());
        }

        let zone_id = zone.id.as_str();
        try_join_all(matching.iter().map(|record| async move {
            let request = self.client.delete(format!(
                "{}/zones/{}/dns_records/{}",
                self.base_url, zone_id, record.id
            ));
            self.call::<serde_json::Value>(&self.dns_auth, request).await
        }))
        .await?;

        info!("Removed {} TXT record(s) {} from zone {}", matching.len(), name, zone.name);
        Ok(())
    }
}
