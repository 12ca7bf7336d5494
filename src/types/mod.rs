// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Wire and configuration types.

pub mod challenge;
pub mod solver_config;

pub use challenge::{ChallengeAction, ChallengePayload, ChallengeRequest, ChallengeResponse, KeyMaterial};
pub use solver_config::{unsupported_reference_kind, ProviderConfig};
