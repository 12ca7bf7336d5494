// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Runs an external program to present or clean up the record.
//!
//! The program is called as `<EXEC_PATH> present|cleanup <fqdn> <value>`, or
//! with `<domain> <token> <keyAuth>` in RAW mode. The request's resolved
//! variables are set on the child process only.

use crate::env::Credentials;
use crate::error::{LegateError, Result};
use crate::providers::dns01::challenge_fqdn;
use crate::providers::DnsProvider;
use crate::types::KeyMaterial;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info, instrument};

pub const NAME: &str = "exec";

pub const ENV_PATH: &str = "EXEC_PATH";
pub const ENV_MODE: &str = "EXEC_MODE";

pub struct ExecProvider {
    program: PathBuf,
    raw: bool,
    env: Vec<(String, String)>,
}

impl ExecProvider {
    pub fn from_credentials(creds: &Credentials) -> Result<Self> {
        let program = creds.require_one_of(NAME, &[ENV_PATH])?;

        let raw = match creds.get(ENV_MODE).as_deref() {
            None => false,
            Some("RAW") => true,
            Some(other) => {
                return Err(LegateError::ProviderConfig {
                    provider: NAME,
                    message: format!("unsupported {} {:?}", ENV_MODE, other),
                })
            }
        };

        Ok(Self {
            program: PathBuf::from(program),
            raw,
            env: creds
                .vars()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    fn args(&self, action: &str, domain: &str, token: &str, key: &KeyMaterial) -> Vec<String> {
        if self.raw {
            vec![
                action.to_string(),
                domain.to_string(),
                token.to_string(),
                key.as_str().to_string(),
            ]
        } else {
            vec![action.to_string(), challenge_fqdn(domain), key.txt_value()]
        }
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true);
        command
    }

    #[instrument(skip(self, domain, token, key), fields(program = %self.program.display()))]
    async fn run(&self, action: &str, domain: &str, token: &str, key: &KeyMaterial) -> Result<()> {
        let args = self.args(action, domain, token, key);
        info!("Running {} {}", self.program.display(), action);

        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|e| LegateError::ProviderFailure {
                provider: NAME,
                message: format!("failed to run {}: {}", self.program.display(), e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("{} output: {}", action, stdout.trim());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LegateError::ProviderFailure {
                provider: NAME,
                message: format!(
                    "{} {} exited with {}: {}",
                    self.program.display(),
                    action,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for ExecProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecProvider")
            .field("program", &self.program)
            .field("raw", &self.raw)
            .field("env", &self.env.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl DnsProvider for ExecProvider {
    async fn present(&self, domain: &str, token: &str, key: &KeyMaterial) -> Result<()> {
        self.run("present", domain, token, key).await
    }

    async fn clean_up(&self, domain: &str, token: &str, key: &KeyMaterial) -> Result<()> {
        self.run("cleanup", domain, token, key).await
    }
}
