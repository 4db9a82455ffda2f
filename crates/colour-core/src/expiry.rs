// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Background worker that removes expired records.
//!
//! Stands in for store-side TTL removal on backends that have none. Each cycle
//! purges records whose `expires_at` has passed, in batches, until a batch
//! comes back short. Reads never consult `expires_at`; a record stays visible
//! until a sweep removes it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;
use tracing::{debug, error, info};

use crate::error::StoreError;
use crate::persistence::RecordStore;

/// Configuration for the expiry sweeper.
#[derive(Debug, Clone)]
pub struct ExpirySweeperConfig {
    /// Whether sweeping is enabled.
    pub enabled: bool,
    /// How often to sweep.
    pub poll_interval: Duration,
    /// Maximum records removed per purge call.
    pub batch_size: i64,
}

impl Default for ExpirySweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval: Duration::from_secs(3600), // 1 hour
            batch_size: 500,
        }
    }
}

impl ExpirySweeperConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `COLOUR_EXPIRY_SWEEP_ENABLED`: "false" or "0" to disable (default: true)
    /// - `COLOUR_EXPIRY_SWEEP_POLL_INTERVAL_SECS`: seconds between sweeps (default: 3600)
    /// - `COLOUR_EXPIRY_SWEEP_BATCH_SIZE`: max records per purge call (default: 500)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = std::env::var("COLOUR_EXPIRY_SWEEP_ENABLED")
            .map(|v| !(v == "false" || v == "0"))
            .unwrap_or(defaults.enabled);

        let poll_interval = std::env::var("COLOUR_EXPIRY_SWEEP_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);

        let batch_size = std::env::var("COLOUR_EXPIRY_SWEEP_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(defaults.batch_size);

        Self {
            enabled,
            poll_interval,
            batch_size,
        }
    }
}

/// Periodically purges expired records from a [`RecordStore`].
pub struct ExpirySweeper {
    store: Arc<dyn RecordStore>,
    config: ExpirySweeperConfig,
    shutdown: Arc<Notify>,
}

impl ExpirySweeper {
    /// Create a new sweeper.
    pub fn new(store: Arc<dyn RecordStore>, config: ExpirySweeperConfig) -> Self {
        Self {
            store,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Get a handle that can be used to signal shutdown.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Run the sweep loop until the shutdown signal is received.
    pub async fn run(&self) {
        if !self.config.enabled {
            info!("Expiry sweeper disabled");
            return;
        }

        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            batch_size = self.config.batch_size,
            "Expiry sweeper started"
        );

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.notified() => {
                    info!("Expiry sweeper received shutdown signal");
                    break;
                }

                _ = tokio::time::sleep(self.config.poll_interval) => {
                    if let Err(e) = self.sweep_once().await {
                        error!(error = %e, "Failed to purge expired records");
                    }
                }
            }
        }

        info!("Expiry sweeper stopped");
    }

    /// Run one sweep cycle. Returns the number of records removed.
    pub async fn sweep_once(&self) -> Result<u64, StoreError> {
        let now = Utc::now();
        let mut total_deleted = 0u64;

        loop {
            let deleted = self
                .store
                .purge_expired(now, self.config.batch_size)
                .await?;
            total_deleted += deleted;

            debug!(
                deleted = deleted,
                total_deleted = total_deleted,
                "Purged batch of expired records"
            );

            // A short batch means nothing expired is left
            if deleted < self.config.batch_size as u64 {
                break;
            }
        }

        if total_deleted > 0 {
            info!(
                total_deleted = total_deleted,
                cutoff = %now,
                "Expiry sweep completed"
            );
        } else {
            debug!("Expiry sweep completed, no expired records found");
        }

        Ok(total_deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, WritePrecondition};
    use crate::record::{Colour, Record};

    async fn seeded_store(expired: usize, live: usize) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let past = Utc::now() - chrono::Duration::days(60);

        for i in 0..expired {
            let rec = Record::new(
                format!("old-{}", i),
                Colour::Red,
                "c",
                past,
                chrono::Duration::days(30),
            );
            store.put(&rec, WritePrecondition::RequireAbsent).await.unwrap();
        }
        for i in 0..live {
            let rec = Record::new(
                format!("new-{}", i),
                Colour::Blue,
                "c",
                Utc::now(),
                chrono::Duration::days(30),
            );
            store.put(&rec, WritePrecondition::RequireAbsent).await.unwrap();
        }
        store
    }

    #[test]
    fn test_config_default() {
        let config = ExpirySweeperConfig::default();
        assert!(config.enabled);
        assert_eq!(config.poll_interval, Duration::from_secs(3600));
        assert_eq!(config.batch_size, 500);
    }

    #[tokio::test]
    async fn test_sweep_once_drains_all_batches() {
        let store = seeded_store(7, 2).await;
        let sweeper = ExpirySweeper::new(
            store.clone(),
            ExpirySweeperConfig {
                batch_size: 3,
                ..Default::default()
            },
        );

        assert_eq!(sweeper.sweep_once().await.unwrap(), 7);
        assert_eq!(store.len().await, 2);
        assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_disabled_sweeper_returns_immediately() {
        let store = seeded_store(1, 0).await;
        let sweeper = ExpirySweeper::new(
            store.clone(),
            ExpirySweeperConfig {
                enabled: false,
                ..Default::default()
            },
        );

        sweeper.run().await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sweeps_on_interval_and_stops_on_shutdown() {
        let store = seeded_store(2, 1).await;
        let sweeper = Arc::new(ExpirySweeper::new(
            store.clone(),
            ExpirySweeperConfig {
                poll_interval: Duration::from_secs(10),
                ..Default::default()
            },
        ));
        let shutdown = sweeper.shutdown_handle();

        let handle = tokio::spawn({
            let sweeper = sweeper.clone();
            async move { sweeper.run().await }
        });

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(store.len().await, 1);

        shutdown.notify_one();
        handle.await.unwrap();
    }
}
