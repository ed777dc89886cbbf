//! # Host State
//!
//! The services a running host owns, wired together.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          HostState                                      │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────────┐  │
//! │  │  Database    │◄─│ DomainStore  │─►│  EventBus                    │  │
//! │  │  (SQLite)    │  │ load / save  │  │  <domain>Changed fan-out     │  │
//! │  └──────────────┘  └──────────────┘  └──────────────────────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────────────────┐  ┌──────────────────────────────┐    │
//! │  │  TrackerHandle               │  │  migration: outcome of the   │    │
//! │  │  connectivity + sync status  │  │  startup run, if it ran      │    │
//! │  └──────────────────────────────┘  └──────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use barflow_core::{ConnectivityStatus, MigrationOutcome, SyncQueueSnapshot};
use barflow_store::{Database, DbConfig, FileLegacyStore, StoreError};
use barflow_sync::{
    BarflowConfig, ConnectivitySignal, ConnectivityTracker, DomainStore, EventBus,
    MigrationRunner, SyncResult, TrackerConfig, TrackerHandle,
};
use tokio::sync::watch;
use tracing::{info, warn};

/// Running services of the host.
pub struct HostState {
    db: Arc<Database>,
    bus: Arc<EventBus>,
    domains: DomainStore,
    tracker: TrackerHandle,
    migration: Option<MigrationOutcome>,
}

impl HostState {
    /// Opens the stores, runs the migration and starts the tracker.
    ///
    /// No platform connectivity or sync-queue signal is available to the
    /// host, so the tracker reports online with an empty queue.
    pub async fn start(config: &BarflowConfig) -> SyncResult<Self> {
        Self::start_with_signals(config, None, None).await
    }

    /// Like [`HostState::start`], with connectivity and queue signals from
    /// the embedding platform.
    pub async fn start_with_signals(
        config: &BarflowConfig,
        connectivity: Option<ConnectivitySignal>,
        queue: Option<watch::Receiver<SyncQueueSnapshot>>,
    ) -> SyncResult<Self> {
        let data_dir = config.data_dir();
        std::fs::create_dir_all(&data_dir).map_err(StoreError::from)?;
        info!(data_dir = %data_dir.display(), "Data directory ready");

        let db = Arc::new(Database::new(DbConfig::new(config.database_path())).await?);

        let migration = if config.migration.enabled {
            let legacy = Arc::new(FileLegacyStore::new(config.legacy_dir()));
            match MigrationRunner::new(legacy, db.clone()).run().await {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    // Logged by the runner; the next start retries
                    warn!(retryable = e.is_retryable(), "Continuing without migrated data");
                    None
                }
            }
        } else {
            info!("Legacy migration disabled");
            None
        };

        let bus = Arc::new(EventBus::new());
        let domains = DomainStore::new(db.clone(), bus.clone());
        let tracker = ConnectivityTracker::spawn(
            TrackerConfig::from(&config.connectivity),
            connectivity,
            queue,
        );

        Ok(HostState {
            db,
            bus,
            domains,
            tracker,
            migration,
        })
    }

    pub fn domains(&self) -> &DomainStore {
        &self.domains
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Outcome of the startup migration. `None` when disabled or failed.
    pub fn migration(&self) -> Option<&MigrationOutcome> {
        self.migration.as_ref()
    }

    /// Latest connectivity and sync status.
    pub fn status(&self) -> ConnectivityStatus {
        self.tracker.status()
    }

    /// Stops the tracker and closes the pool.
    pub async fn shutdown(self) -> SyncResult<()> {
        self.tracker.shutdown().await?;
        self.db.close().await;
        Ok(())
    }
}
