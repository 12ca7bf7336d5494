// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use legate::config::Config;
use legate::kubernetes::create_client;
use legate::providers::ProviderRegistry;
use legate::solver::{DelegatingSolver, Solver};
use legate::webhook::{self, Webhook};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting legate DNS-01 webhook");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: group_name={}, solver_name={}, listen_address={}",
        config.group_name, config.solver_name, config.listen_address
    );

    // Create Kubernetes client
    let client = create_client(&config).await?;
    info!("Connected to Kubernetes cluster");

    let registry = ProviderRegistry::with_defaults();
    info!(
        "Available DNS providers: {}",
        registry.names().collect::<Vec<_>>().join(", ")
    );

    let mut solver = DelegatingSolver::new(&config.solver_name, registry);
    solver.initialize(client).await?;

    let webhook = Webhook::new(&config.group_name, Arc::new(solver));
    webhook::run(&config, webhook).await?;

    Ok(())
}
