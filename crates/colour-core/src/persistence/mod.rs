// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Record store interface and backend implementations.
//!
//! The store is the only shared mutable resource. Cross-request consistency
//! comes entirely from the existence precondition declared on each write;
//! backends must evaluate the precondition and the write atomically.

pub mod memory;
pub mod sqlite;

pub use self::memory::MemoryStore;
pub use self::sqlite::SqliteStore;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::record::Record;

/// Existence precondition declared on a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePrecondition {
    /// The id must not exist yet (create).
    RequireAbsent,
    /// The id must already exist (update).
    RequireExists,
}

impl WritePrecondition {
    /// Returns the string representation of the precondition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequireAbsent => "require_absent",
            Self::RequireExists => "require_exists",
        }
    }
}

impl fmt::Display for WritePrecondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value record store used by the record service.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup.
    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError>;

    /// Write `record`, failing with [`StoreError::ConditionFailed`] when the
    /// precondition does not hold.
    async fn put(&self, record: &Record, precondition: WritePrecondition)
    -> Result<(), StoreError>;

    /// Remove the record. Conditioned on existence: an absent id fails with
    /// [`StoreError::ConditionFailed`] carrying `RequireExists`.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Every record in the collection.
    async fn scan(&self) -> Result<Vec<Record>, StoreError>;

    /// Records whose correlation id matches, through the secondary index.
    async fn query_by_correlation(&self, correlation_id: &str)
    -> Result<Vec<Record>, StoreError>;

    /// Remove up to `limit` records that expired at or before `now`.
    ///
    /// Returns the number of records removed.
    async fn purge_expired(&self, now: DateTime<Utc>, limit: i64) -> Result<u64, StoreError>;

    /// Whether the backend is reachable.
    async fn health_check(&self) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_display() {
        assert_eq!(WritePrecondition::RequireAbsent.to_string(), "require_absent");
        assert_eq!(WritePrecondition::RequireExists.to_string(), "require_exists");
    }
}
