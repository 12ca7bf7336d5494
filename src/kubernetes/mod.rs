// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation and object lookups.

pub mod client;
pub mod lookup;

pub use client::create_client;
pub use lookup::{config_map_data, config_map_value, secret_data, secret_value};
