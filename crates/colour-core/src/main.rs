// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Colour Core - Colour Record Service
//!
//! Serves the record operations over HTTP, backed by SQLite when
//! `COLOUR_DATABASE_URL` is set and by an in-memory store otherwise.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use colour_core::config::Config;
use colour_core::expiry::{ExpirySweeper, ExpirySweeperConfig};
use colour_core::persistence::{MemoryStore, RecordStore, SqliteStore};
use colour_core::server;
use colour_core::service::RecordService;
use colour_core::telemetry::TracingSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("colour_core=info".parse()?),
        )
        .init();

    info!("Starting Colour Core");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        http_addr = %config.http_addr,
        database = config.database_url.as_deref().unwrap_or("memory"),
        retention_days = config.retention_days,
        "Configuration loaded"
    );

    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            info!("Opening SQLite store...");
            let store = SqliteStore::from_path(url).await?;
            info!("SQLite store ready, migrations applied");
            Arc::new(store)
        }
        None => {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    if !store.health_check().await? {
        anyhow::bail!("store health check failed");
    }
    info!("Store health check passed");

    let service = Arc::new(
        RecordService::new(store.clone(), Arc::new(TracingSink))
            .with_retention(config.retention()),
    );

    // Start expiry sweeper
    let sweeper = Arc::new(ExpirySweeper::new(store, ExpirySweeperConfig::from_env()));
    let sweeper_shutdown = sweeper.shutdown_handle();
    let sweeper_handle = tokio::spawn({
        let sweeper = sweeper.clone();
        async move { sweeper.run().await }
    });

    info!("Colour Core initialized successfully");

    // Serve until Ctrl+C
    if let Err(e) = server::serve(config.http_addr, service, shutdown_signal()).await {
        error!("HTTP server error: {}", e);
    }

    info!("Shutting down...");
    sweeper_shutdown.notify_one();
    if let Err(e) = sweeper_handle.await {
        error!("Expiry sweeper task failed: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
