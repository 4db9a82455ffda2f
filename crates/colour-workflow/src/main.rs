// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Colour Workflow - runs one synthetic batch and prints its outcome.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use colour_workflow::{DriverConfig, RandomChaos, WorkflowDriver, backend};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("colour_workflow=info".parse()?),
        )
        .init();

    let config = DriverConfig::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        iterations = config.iterations,
        failure_rate = config.failure_rate,
        api_url = config.api_url.as_deref().unwrap_or("embedded"),
        "Configuration loaded"
    );

    let api = backend::from_config(&config)?;
    let chaos = Arc::new(RandomChaos::new(config.failure_rate));
    let iterations = config.iterations;
    let driver = WorkflowDriver::new(api, chaos, config);

    let outcome = driver.run(iterations).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.is_success() {
        anyhow::bail!("workflow run {} did not succeed", outcome.run_id);
    }

    Ok(())
}
