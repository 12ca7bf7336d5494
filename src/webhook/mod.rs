// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP(S) server exposing a solver through the cert-manager webhook API.

pub mod routes;
pub mod server;
pub mod tls;

pub use routes::Webhook;
pub use server::{serve, shutdown_signal};

use crate::config::Config;
use crate::error::Result;
use tokio::net::TcpListener;

/// Bind the configured address and serve until SIGINT or SIGTERM
pub async fn run(config: &Config, webhook: Webhook) -> Result<()> {
    let tls = config.tls.as_ref().map(tls::acceptor).transpose()?;
    let listener = TcpListener::bind(config.listen_address).await?;
    serve(listener, tls, webhook, shutdown_signal()).await
}
