//! # Key-Value Repository
//!
//! SQL for the `kv_store` table.
//!
//! ## Batch Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   set_batch(items) - SINGLE TRANSACTION                 │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    INSERT ... ON CONFLICT(key) DO UPDATE   ← inventory                 │
//! │    INSERT ... ON CONFLICT(key) DO UPDATE   ← staff                     │
//! │    ...                                                                  │
//! │  COMMIT  ← every key lands, or (on any error) ROLLBACK and none do     │
//! │                                                                         │
//! │  Upserts make a repeated batch a full overwrite, never an append.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use barflow_core::MigrationItem;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

const UPSERT_SQL: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

/// Repository for the key-value table.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    /// Creates a new KvRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Reads and decodes one key.
    ///
    /// A stored document that no longer parses is a `ReadFailure` for that
    /// key.
    pub async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        raw.map(|raw| serde_json::from_str(&raw).map_err(|e| StoreError::read_failure(key, e)))
            .transpose()
    }

    /// Upserts one key.
    pub async fn set(&self, key: &str, value: &Value) -> StoreResult<()> {
        let encoded = serde_json::to_string(value)?;

        sqlx::query(UPSERT_SQL)
            .bind(key)
            .bind(encoded)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Upserts every item inside one transaction.
    pub async fn set_batch(&self, items: &[MigrationItem]) -> StoreResult<()> {
        debug!(items = items.len(), "Writing key-value batch");

        // Encode first so a bad value never opens a transaction
        let encoded = items
            .iter()
            .map(|item| -> StoreResult<(&str, String)> {
                Ok((item.key.as_str(), serde_json::to_string(&item.value)?))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        for (key, value) in encoded {
            sqlx::query(UPSERT_SQL)
                .bind(key)
                .bind(value)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Deletes one key. Returns whether a row was removed.
    pub async fn delete(&self, key: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists stored keys in lexical order.
    pub async fn keys(&self) -> StoreResult<Vec<String>> {
        let keys = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    /// Counts stored keys (for diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
