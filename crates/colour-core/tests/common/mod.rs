// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for colour-core integration tests.
//!
//! Provides TestContext wiring a RecordService to a store and a recording
//! telemetry sink.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use colour_core::error::StoreError;
use colour_core::persistence::{MemoryStore, RecordStore, SqliteStore, WritePrecondition};
use colour_core::record::Record;
use colour_core::service::RecordService;
use colour_core::telemetry::RecordingSink;

/// Service plus the collaborators tests inspect.
pub struct TestContext {
    pub service: Arc<RecordService>,
    pub store: Arc<dyn RecordStore>,
    pub sink: Arc<RecordingSink>,
}

impl TestContext {
    /// Service over a fresh in-memory store.
    pub fn memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Service over a fresh in-memory SQLite database.
    pub async fn sqlite() -> Self {
        let store = SqliteStore::in_memory()
            .await
            .expect("Failed to open in-memory SQLite store");
        Self::with_store(Arc::new(store))
    }

    /// Service over the given store.
    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        let sink = Arc::new(RecordingSink::new());
        let service = Arc::new(RecordService::new(store.clone(), sink.clone()));
        Self {
            service,
            store,
            sink,
        }
    }
}

/// Store whose every call fails with a backend error.
pub struct BrokenStore;

fn broken(operation: &str) -> StoreError {
    StoreError::Backend {
        operation: operation.to_string(),
        details: "connection refused".to_string(),
    }
}

#[async_trait]
impl RecordStore for BrokenStore {
    async fn get(&self, _id: &str) -> Result<Option<Record>, StoreError> {
        Err(broken("get"))
    }

    async fn put(
        &self,
        _record: &Record,
        _precondition: WritePrecondition,
    ) -> Result<(), StoreError> {
        Err(broken("put"))
    }

    async fn delete(&self, _id: &str) -> Result<(), StoreError> {
        Err(broken("delete"))
    }

    async fn scan(&self) -> Result<Vec<Record>, StoreError> {
        Err(broken("scan"))
    }

    async fn query_by_correlation(
        &self,
        _correlation_id: &str,
    ) -> Result<Vec<Record>, StoreError> {
        Err(broken("query"))
    }

    async fn purge_expired(&self, _now: DateTime<Utc>, _limit: i64) -> Result<u64, StoreError> {
        Err(broken("purge"))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Err(broken("health_check"))
    }
}
