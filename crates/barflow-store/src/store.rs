//! # Store Contracts
//!
//! The two storage seams the migration runs between.
//!
//! ```text
//! ┌──────────────────────────┐   load(key)    ┌──────────────────────────┐
//! │  LegacyStore (sync)      │ ─────────────► │  MigrationRunner         │
//! │  FileLegacyStore         │                │                          │
//! │  MemoryLegacyStore       │                │  set_batch(items)        │
//! └──────────────────────────┘                │  set(marker)             │
//!                                             └────────────┬─────────────┘
//!                                                          ▼
//!                                             ┌──────────────────────────┐
//!                                             │  KeyValueStore (async)   │
//!                                             │  Database (SQLite)       │
//!                                             │  MemoryStore             │
//!                                             └──────────────────────────┘
//! ```

use async_trait::async_trait;
use barflow_core::MigrationItem;
use serde_json::Value;

use crate::error::StoreResult;

/// Synchronous key-value store written by the previous app build.
///
/// Values are JSON documents. A missing key, or a key holding JSON `null`,
/// loads as `Ok(None)`.
pub trait LegacyStore: Send + Sync {
    /// Reads one key.
    ///
    /// ## Errors
    /// `StoreError::ReadFailure` when the stored data for *this key* is
    /// unreadable. Other keys are unaffected.
    fn load(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Writes one key, replacing any previous value.
    fn save(&self, key: &str, value: &Value) -> StoreResult<()>;
}

/// Asynchronous embedded store: the migration target and the app's live
/// storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads one key.
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Writes one key (full overwrite).
    async fn set(&self, key: &str, value: &Value) -> StoreResult<()>;

    /// Writes several keys at once.
    ///
    /// Implementations apply either every item or none of them. Each item is
    /// a full overwrite of its key.
    async fn set_batch(&self, items: &[MigrationItem]) -> StoreResult<()>;
}
