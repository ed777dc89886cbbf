//! # One-Time Storage Migration
//!
//! Copies every namespace from the legacy key-value store into the async
//! store, then writes a completion marker so it never runs again.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       MigrationRunner::run()                            │
//! │                                                                         │
//! │  single-flight lock                                                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  target.get("migration_completed") ── present ──► AlreadyCompleted      │
//! │        │ absent                                                         │
//! │        ▼                                                                │
//! │  for ns in Namespace::ALL:                                              │
//! │      legacy.load(ns) ── Ok(Some(v)) ──► items.push(ns, v)               │
//! │                      ── Ok(None)    ──► skip                            │
//! │                      ── Err(e)      ──► warn, skip                      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  items non-empty? ── yes ──► target.set_batch(items)   ─┐               │
//! │        │                                                │ error         │
//! │        ▼                                                ▼               │
//! │  target.set(marker {timestamp, itemsCount})  ──► MigrationWrite         │
//! │        │                                         on_error, no marker    │
//! │        ▼                                                                │
//! │  on_success ──► Completed(record)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Retrying after a failed write copies every namespace again. Each item is
//! a full overwrite of its key, so repeated copies are harmless.

use std::sync::Arc;

use barflow_core::{MigrationItem, MigrationOutcome, MigrationRecord, Namespace, MIGRATION_MARKER_KEY};
use barflow_store::{KeyValueStore, LegacyStore, StoreError};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Migration Observer
// =============================================================================

/// Receives the outcome of migrations that actually ran.
///
/// Not called when the marker was already present.
pub trait MigrationObserver: Send + Sync {
    /// The data was copied and the marker written.
    fn on_success(&self, record: &MigrationRecord);

    /// The batch or marker write failed. The next run retries.
    fn on_error(&self, error: &SyncError);
}

/// Observer that ignores every outcome.
pub struct NoOpObserver;

impl MigrationObserver for NoOpObserver {
    fn on_success(&self, _record: &MigrationRecord) {}
    fn on_error(&self, _error: &SyncError) {}
}

// =============================================================================
// Migration Runner
// =============================================================================

/// Moves legacy data into the async store exactly once.
pub struct MigrationRunner {
    legacy: Arc<dyn LegacyStore>,
    target: Arc<dyn KeyValueStore>,
    observer: Arc<dyn MigrationObserver>,
    in_flight: Mutex<()>,
}

impl MigrationRunner {
    pub fn new(legacy: Arc<dyn LegacyStore>, target: Arc<dyn KeyValueStore>) -> Self {
        MigrationRunner {
            legacy,
            target,
            observer: Arc::new(NoOpObserver),
            in_flight: Mutex::new(()),
        }
    }

    /// Sets the observer notified after each attempt.
    pub fn with_observer(mut self, observer: Arc<dyn MigrationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Runs the migration unless the completion marker is already present.
    ///
    /// Concurrent calls queue behind the first; by the time a later caller
    /// gets in, the marker is written and it returns
    /// [`MigrationOutcome::AlreadyCompleted`].
    ///
    /// ## Errors
    /// [`SyncError::MigrationWrite`] when reading the marker, the batch write
    /// or the marker write fails. The marker is left absent.
    ///
    /// A marker that exists but no longer parses still counts as completed:
    /// it is only ever written after the batch committed.
    pub async fn run(&self) -> SyncResult<MigrationOutcome> {
        let _guard = self.in_flight.lock().await;
        let run_id = Uuid::new_v4();

        match self.migrate(run_id).await {
            Ok(outcome) => {
                if let MigrationOutcome::Completed(record) = &outcome {
                    info!(%run_id, items = record.items_count, "Legacy migration completed");
                    self.observer.on_success(record);
                }
                Ok(outcome)
            }
            Err(e) => {
                error!(%run_id, error = %e, "Legacy migration failed, will retry on next run");
                self.observer.on_error(&e);
                Err(e)
            }
        }
    }

    /// Returns the stored completion marker, if the migration has run.
    pub async fn marker(&self) -> SyncResult<Option<MigrationRecord>> {
        match self.target.get(MIGRATION_MARKER_KEY).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn migrate(&self, run_id: Uuid) -> SyncResult<MigrationOutcome> {
        match self.target.get(MIGRATION_MARKER_KEY).await {
            Ok(Some(marker)) => {
                debug!(%run_id, %marker, "Migration marker present, skipping");
                return Ok(MigrationOutcome::AlreadyCompleted);
            }
            Ok(None) => {}
            Err(StoreError::ReadFailure { reason, .. }) => {
                warn!(%run_id, %reason, "Migration marker unreadable, treating as completed");
                return Ok(MigrationOutcome::AlreadyCompleted);
            }
            Err(e) => return Err(SyncError::MigrationWrite(e)),
        }

        info!(%run_id, "Starting legacy migration");

        let items = self.collect_items(run_id);

        if items.is_empty() {
            debug!(%run_id, "No legacy data found");
        } else {
            self.target
                .set_batch(&items)
                .await
                .map_err(SyncError::MigrationWrite)?;
            debug!(%run_id, items = items.len(), "Batch written");
        }

        let record = MigrationRecord::completed_at(Utc::now(), items.len() as u32);
        let marker = serde_json::to_value(&record)
            .map_err(|e| SyncError::MigrationWrite(StoreError::from(e)))?;
        self.target
            .set(MIGRATION_MARKER_KEY, &marker)
            .await
            .map_err(SyncError::MigrationWrite)?;

        Ok(MigrationOutcome::Completed(record))
    }

    /// Reads every namespace, keeping the ones that loaded.
    fn collect_items(&self, run_id: Uuid) -> Vec<MigrationItem> {
        Namespace::ALL
            .into_iter()
            .filter_map(|ns| match self.legacy.load(ns.key()) {
                Ok(Some(value)) => {
                    debug!(%run_id, namespace = %ns, "Read legacy namespace");
                    Some(MigrationItem::new(ns, value))
                }
                Ok(None) => None,
                Err(e) => {
                    warn!(%run_id, namespace = %ns, error = %e, "Skipping unreadable namespace");
                    None
                }
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
