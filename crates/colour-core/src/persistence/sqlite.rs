// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! SQLite-backed record store.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::error::StoreError;
use crate::record::Record;

use super::{RecordStore, WritePrecondition};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/sqlite");

/// SQLite-backed record store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new store from an existing, already migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create and initialize a store from a file path.
    ///
    /// Creates parent directories and the database file if needed, then runs
    /// migrations. A leading `sqlite:` scheme is accepted and stripped.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = path.to_string_lossy();
        let path = Path::new(raw.strip_prefix("sqlite:").unwrap_or(raw.as_ref()));

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
                operation: "create_dir".to_string(),
                details: format!("Failed to create directory {:?}: {}", parent, e),
            })?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.to_string_lossy());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .map_err(|e| StoreError::Backend {
                operation: "connect".to_string(),
                details: format!("Failed to connect to SQLite at {:?}: {}", path, e),
            })?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Create a private in-memory database.
    ///
    /// Limited to one connection; every connection to `sqlite::memory:` would
    /// otherwise open its own empty database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
        MIGRATOR.run(pool).await.map_err(|e| StoreError::Backend {
            operation: "migrate".to_string(),
            details: format!("Failed to run migrations: {}", e),
        })
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let record = sqlx::query_as::<_, Record>(
            r#"
            SELECT id, colour, correlation_id, updated_at, expires_at
            FROM records
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn put(
        &self,
        record: &Record,
        precondition: WritePrecondition,
    ) -> Result<(), StoreError> {
        let result = match precondition {
            WritePrecondition::RequireAbsent => {
                sqlx::query(
                    r#"
                    INSERT INTO records (id, colour, correlation_id, updated_at, expires_at)
                    VALUES (?, ?, ?, ?, ?)
                    ON CONFLICT(id) DO NOTHING
                    "#,
                )
                .bind(&record.id)
                .bind(record.colour.as_str())
                .bind(&record.correlation_id)
                .bind(record.updated_at)
                .bind(record.expires_at)
                .execute(&self.pool)
                .await?
            }
            WritePrecondition::RequireExists => {
                sqlx::query(
                    r#"
                    UPDATE records
                    SET colour = ?, correlation_id = ?, updated_at = ?, expires_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(record.colour.as_str())
                .bind(&record.correlation_id)
                .bind(record.updated_at)
                .bind(record.expires_at)
                .bind(&record.id)
                .execute(&self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(StoreError::ConditionFailed {
                id: record.id.clone(),
                precondition,
            });
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ConditionFailed {
                id: id.to_string(),
                precondition: WritePrecondition::RequireExists,
            });
        }

        Ok(())
    }

    async fn scan(&self) -> Result<Vec<Record>, StoreError> {
        let records = sqlx::query_as::<_, Record>(
            r#"
            SELECT id, colour, correlation_id, updated_at, expires_at
            FROM records
            ORDER BY updated_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn query_by_correlation(
        &self,
        correlation_id: &str,
    ) -> Result<Vec<Record>, StoreError> {
        let records = sqlx::query_as::<_, Record>(
            r#"
            SELECT id, colour, correlation_id, updated_at, expires_at
            FROM records
            WHERE correlation_id = ?
            ORDER BY updated_at ASC, id ASC
            "#,
        )
        .bind(correlation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn purge_expired(&self, now: DateTime<Utc>, limit: i64) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM records
            WHERE id IN (
                SELECT id FROM records
                WHERE expires_at <= ?
                ORDER BY expires_at ASC
                LIMIT ?
            )
            "#,
        )
        .bind(now)
        .bind(limit)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(row.0 == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Colour;
    use chrono::Duration;
    use uuid::Uuid;

    fn record(correlation_id: &str) -> Record {
        Record::new(
            Uuid::new_v4().to_string(),
            Colour::Red,
            correlation_id,
            Utc::now(),
            Duration::days(30),
        )
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = SqliteStore::in_memory().await.expect("in-memory store");
        let rec = record("batch");

        store
            .put(&rec, WritePrecondition::RequireAbsent)
            .await
            .expect("Failed to insert record");

        let stored = store
            .get(&rec.id)
            .await
            .expect("Failed to get record")
            .expect("Record should exist");

        assert_eq!(stored.id, rec.id);
        assert_eq!(stored.colour, Colour::Red);
        assert_eq!(stored.correlation_id, "batch");
        assert_eq!(stored.updated_at, rec.updated_at);
        assert_eq!(stored.expires_at, rec.expires_at);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(store.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_collision_fails_precondition() {
        let store = SqliteStore::in_memory().await.unwrap();
        let rec = record("batch");

        store.put(&rec, WritePrecondition::RequireAbsent).await.unwrap();
        let err = store
            .put(&rec, WritePrecondition::RequireAbsent)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            StoreError::ConditionFailed {
                id: rec.id.clone(),
                precondition: WritePrecondition::RequireAbsent,
            }
        );
    }

    #[tokio::test]
    async fn test_update_requires_existing() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut rec = record("batch");

        let err = store
            .put(&rec, WritePrecondition::RequireExists)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::ConditionFailed {
                precondition: WritePrecondition::RequireExists,
                ..
            }
        ));
        assert!(store.scan().await.unwrap().is_empty());

        store.put(&rec, WritePrecondition::RequireAbsent).await.unwrap();
        rec.colour = Colour::Blue;
        rec.updated_at = rec.updated_at + Duration::seconds(5);
        store.put(&rec, WritePrecondition::RequireExists).await.unwrap();

        let stored = store.get(&rec.id).await.unwrap().unwrap();
        assert_eq!(stored.colour, Colour::Blue);
        assert_eq!(stored.updated_at, rec.updated_at);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = SqliteStore::in_memory().await.unwrap();
        let rec = record("batch");
        store.put(&rec, WritePrecondition::RequireAbsent).await.unwrap();

        store.delete(&rec.id).await.expect("first delete succeeds");
        let err = store.delete(&rec.id).await.unwrap_err();
        assert!(matches!(err, StoreError::ConditionFailed { .. }));
    }

    #[tokio::test]
    async fn test_query_by_correlation_and_scan() {
        let store = SqliteStore::in_memory().await.unwrap();
        for c in ["c1", "c2", "c1"] {
            store
                .put(&record(c), WritePrecondition::RequireAbsent)
                .await
                .unwrap();
        }

        let c1 = store.query_by_correlation("c1").await.unwrap();
        assert_eq!(c1.len(), 2);
        assert!(c1.iter().all(|r| r.correlation_id == "c1"));
        assert!(store.query_by_correlation("c3").await.unwrap().is_empty());
        assert_eq!(store.scan().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = SqliteStore::in_memory().await.unwrap();
        let past = Utc::now() - Duration::days(31);
        for _ in 0..3 {
            let rec = Record::new(
                Uuid::new_v4().to_string(),
                Colour::Black,
                "old",
                past,
                Duration::days(30),
            );
            store.put(&rec, WritePrecondition::RequireAbsent).await.unwrap();
        }
        store
            .put(&record("new"), WritePrecondition::RequireAbsent)
            .await
            .unwrap();

        assert_eq!(store.purge_expired(Utc::now(), 2).await.unwrap(), 2);
        assert_eq!(store.purge_expired(Utc::now(), 2).await.unwrap(), 1);
        assert_eq!(store.purge_expired(Utc::now(), 2).await.unwrap(), 0);

        let remaining = store.scan().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].correlation_id, "new");
    }

    #[tokio::test]
    async fn test_from_path_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("records.db");

        let store = SqliteStore::from_path(&path).await.expect("store from path");
        assert!(store.health_check().await.unwrap());
        assert!(path.exists());
        store.close().await;
    }
}
