// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Environment-style credential declarations: expansion, resolution and scoping.

pub mod credentials;
pub mod expansion;
pub mod resolver;

pub use credentials::Credentials;
pub use resolver::EnvResolver;
