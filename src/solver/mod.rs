// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! cert-manager DNS-01 solver contract.

pub mod delegating;

use crate::error::Result;
use crate::types::ChallengeRequest;
use async_trait::async_trait;
use kube::Client;

pub use delegating::DelegatingSolver;

#[async_trait]
pub trait Solver: Send + Sync {
    /// Name the solver is referenced by on the Issuer, unique within the API group
    fn name(&self) -> &str;

    /// Called once before the webhook starts serving
    async fn initialize(&mut self, client: Client) -> Result<()>;

    /// Publish the challenge record. May be called repeatedly for the same request.
    async fn present(&self, request: &ChallengeRequest) -> Result<()>;

    /// Remove the record matching this request's key, leaving other
    /// validations of the same name alone
    async fn clean_up(&self, request: &ChallengeRequest) -> Result<()>;
}
