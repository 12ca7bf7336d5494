// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generic HTTP provider: POSTs the record to `<endpoint>/present` and
//! `<endpoint>/cleanup`, leaving the DNS work to an external service.

use crate::env::Credentials;
use crate::error::{LegateError, Result};
use crate::providers::dns01::challenge_fqdn;
use crate::providers::DnsProvider;
use crate::types::KeyMaterial;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

pub const NAME: &str = "httpreq";

pub const ENV_ENDPOINT: &str = "HTTPREQ_ENDPOINT";
pub const ENV_MODE: &str = "HTTPREQ_MODE";
pub const ENV_USERNAME: &str = "HTTPREQ_USERNAME";
pub const ENV_PASSWORD: &str = "HTTPREQ_PASSWORD";
pub const ENV_HTTP_TIMEOUT: &str = "HTTPREQ_HTTP_TIMEOUT";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Sends `{fqdn, value}`
    Default,
    /// Sends `{domain, token, keyAuth}`
    Raw,
}

#[derive(Serialize)]
struct RecordMessage<'a> {
    fqdn: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage<'a> {
    domain: &'a str,
    token: &'a str,
    key_auth: &'a str,
}

pub struct HttpReqProvider {
    endpoint: Url,
    mode: Mode,
    basic_auth: Option<(String, String)>,
    client: reqwest::Client,
}

impl HttpReqProvider {
    pub fn from_credentials(creds: &Credentials) -> Result<Self> {
        let endpoint = creds.require_one_of(NAME, &[ENV_ENDPOINT])?;
        let endpoint = Url::parse(&endpoint).map_err(|e| LegateError::ProviderConfig {
            provider: NAME,
            message: format!("invalid {} {:?}: {}", ENV_ENDPOINT, endpoint, e),
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(LegateError::ProviderConfig {
                provider: NAME,
                message: format!("{} must be a hierarchical URL", ENV_ENDPOINT),
            });
        }

        let mode = match creds.get(ENV_MODE).as_deref() {
            None => Mode::Default,
            Some("RAW") => Mode::Raw,
            Some(other) => {
                return Err(LegateError::ProviderConfig {
                    provider: NAME,
                    message: format!("unsupported {} {:?}", ENV_MODE, other),
                })
            }
        };

        let basic_auth = match (creds.get(ENV_USERNAME), creds.get(ENV_PASSWORD)) {
            (Some(user), Some(password)) => Some((user, password)),
            (None, None) => None,
            _ => {
                return Err(LegateError::ProviderConfig {
                    provider: NAME,
                    message: format!("{} and {} must be set together", ENV_USERNAME, ENV_PASSWORD),
                })
            }
        };

        let timeout = parse_secs(creds, ENV_HTTP_TIMEOUT, DEFAULT_HTTP_TIMEOUT_SECS)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self {
            endpoint,
            mode,
            basic_auth,
            client,
        })
    }

    #[instrument(skip(self, body), fields(endpoint = %self.endpoint))]
    async fn post<T: Serialize + ?Sized>(&self, action: &str, body: &T) -> Result<()> {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(action);
        }

        let mut request = self.client.post(url.clone()).json(body);
        if let Some((user, password)) = &self.basic_auth {
            request = request.basic_auth(user, Some(password));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LegateError::ProviderFailure {
                provider: NAME,
                message: format!("{} returned {}: {}", url, status, text.trim()),
            });
        }

        debug!("{} accepted by {}", action, url);
        Ok(())
    }

    async fn send(&self, action: &str, domain: &str, token: &str, key: &KeyMaterial) -> Result<()> {
        match self.mode {
            Mode::Raw => {
                let msg = RawMessage {
                    domain,
                    token,
                    key_auth: key.as_str(),
                };
                self.post(action, &msg).await
            }
            Mode::Default => {
                let fqdn = challenge_fqdn(domain);
                let value = key.txt_value();
                info!("{} TXT record {}", action, fqdn);
                let msg = RecordMessage {
                    fqdn: &fqdn,
                    value: &value,
                };
                self.post(action, &msg).await
            }
        }
    }
}

impl std::fmt::Debug for HttpReqProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpReqProvider")
            .field("endpoint", &self.endpoint.as_str())
            .field("mode", &self.mode)
            .field("basic_auth", &self.basic_auth.is_some())
            .finish()
    }
}

#[async_trait]
impl DnsProvider for HttpReqProvider {
    async fn present(&self, domain: &str, token: &str, key: &KeyMaterial) -> Result<()> {
        self.send("present", domain, token, key).await
    }

    async fn clean_up(&self, domain: &str, token: &str, key: &KeyMaterial) -> Result<()> {
        self.send("cleanup", domain, token, key).await
    }
}

fn parse_secs(creds: &Credentials, name: &str, default: u64) -> Result<u64> {
    match creds.get(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| LegateError::ProviderConfig {
            provider: NAME,
            message: format!("{} must be a number of seconds, got {:?}", name, raw),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds(pairs: &[(&str, &str)]) -> Credentials {
        Credentials::new(
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())),
            false,
        )
    }

    #[test]
    fn test_endpoint_required() {
        let err = HttpReqProvider::from_credentials(&creds(&[])).unwrap_err();
        assert!(matches!(err, LegateError::MissingCredentials { .. }));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(HttpReqProvider::from_credentials(&creds(&[(ENV_ENDPOINT, "not a url")])).is_err());
        assert!(HttpReqProvider::from_credentials(&creds(&[(ENV_ENDPOINT, "mailto:ops@example.com")])).is_err());
        assert!(HttpReqProvider::from_credentials(&creds(&[
            (ENV_ENDPOINT, "https://dns.example.com"),
            (ENV_MODE, "FANCY"),
        ]))
        .is_err());
        assert!(HttpReqProvider::from_credentials(&creds(&[
            (ENV_ENDPOINT, "https://dns.example.com"),
            (ENV_USERNAME, "only-user"),
        ]))
        .is_err());
        assert!(HttpReqProvider::from_credentials(&creds(&[
            (ENV_ENDPOINT, "https://dns.example.com"),
            (ENV_HTTP_TIMEOUT, "soon"),
        ]))
        .is_err());
    }

    #[tokio::test]
    async fn test_present_and_cleanup_default_mode() {
        let server = MockServer::start().await;
        let record = json!({"fqdn": "_acme-challenge.example.com.", "value": "txt-value"});
        for action in ["present", "cleanup"] {
            Mock::given(method("POST"))
                .and(path(format!("/api/{}", action)))
                .and(header("authorization", "Basic YWNtZTpodW50ZXIy"))
                .and(body_json(&record))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .expect(1)
                .mount(&server)
                .await;
        }
        let endpoint = format!("{}/api/", server.uri());

        let provider = HttpReqProvider::from_credentials(&creds(&[
            (ENV_ENDPOINT, endpoint.as_str()),
            (ENV_USERNAME, "acme"),
            (ENV_PASSWORD, "hunter2"),
        ]))
        .unwrap();
        let key = KeyMaterial::Digest("txt-value".to_string());

        provider.present("example.com.", "tok", &key).await.unwrap();
        provider.clean_up("example.com.", "tok", &key).await.unwrap();

        let paths: Vec<_> = server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.url.path().to_string())
            .collect();
        assert_eq!(paths, vec!["/api/present", "/api/cleanup"]);
    }

    #[tokio::test]
    async fn test_raw_mode_sends_key_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/present"))
            .and(body_json(json!({"domain": "example.com.", "token": "tok", "keyAuth": "tok.thumbprint"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let provider = HttpReqProvider::from_credentials(&creds(&[
            (ENV_ENDPOINT, server.uri().as_str()),
            (ENV_MODE, "RAW"),
        ]))
        .unwrap();
        let key = KeyMaterial::Authorization("tok.thumbprint".to_string());

        provider.present("example.com.", "tok", &key).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/present"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let provider =
            HttpReqProvider::from_credentials(&creds(&[(ENV_ENDPOINT, server.uri().as_str())])).unwrap();
        let err = provider
            .present("example.com.", "tok", &KeyMaterial::Digest("v".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, LegateError::ProviderFailure { provider: "httpreq", .. }));
        assert!(err.to_string().contains("upstream exploded"));
    }
}
