// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory record store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::record::Record;

use super::{RecordStore, WritePrecondition};

/// Process-local store. Preconditions are checked under the write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, Record>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn sorted(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by(|a, b| {
        a.updated_at
            .cmp(&b.updated_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    records
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn put(
        &self,
        record: &Record,
        precondition: WritePrecondition,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let exists = records.contains_key(&record.id);

        let holds = match precondition {
            WritePrecondition::RequireAbsent => !exists,
            WritePrecondition::RequireExists => exists,
        };
        if !holds {
            return Err(StoreError::ConditionFailed {
                id: record.id.clone(),
                precondition,
            });
        }

        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        match self.records.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::ConditionFailed {
                id: id.to_string(),
                precondition: WritePrecondition::RequireExists,
            }),
        }
    }

    async fn scan(&self) -> Result<Vec<Record>, StoreError> {
        let records = self.records.read().await.values().cloned().collect();
        Ok(sorted(records))
    }

    async fn query_by_correlation(
        &self,
        correlation_id: &str,
    ) -> Result<Vec<Record>, StoreError> {
        let records = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.correlation_id == correlation_id)
            .cloned()
            .collect();
        Ok(sorted(records))
    }

    async fn purge_expired(&self, now: DateTime<Utc>, limit: i64) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let expired: Vec<String> = records
            .values()
            .filter(|r| r.is_expired(now))
            .take(limit.max(0) as usize)
            .map(|r| r.id.clone())
            .collect();

        for id in &expired {
            records.remove(id);
        }
        Ok(expired.len() as u64)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
