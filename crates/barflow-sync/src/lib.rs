//! # barflow-sync: Local Data Synchronization for BarFlow Track
//!
//! Keeps the app's local data consistent: a one-shot migration from the
//! legacy store, change notifications between UI consumers, and the
//! offline/sync status shown to staff.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Local Data Layer                                  │
//! │                                                                         │
//! │  startup                                                                │
//! │  ───────                                                                │
//! │  MigrationRunner::run()  legacy/*.json ──► SQLite kv_store (once)      │
//! │                                                                         │
//! │  steady state                                                           │
//! │  ────────────                                                           │
//! │  UI mutation ──► DomainStore::save ──► KeyValueStore::set               │
//! │                                   └──► EventBus::publish(domain)        │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                         subscribers re-read via DomainStore::load       │
//! │                                                                         │
//! │  ConnectivityTracker                                                    │
//! │  mpsc<bool> + watch<SyncQueueSnapshot> ──► watch<ConnectivityStatus>    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`migration`] - One-time legacy migration with single-flight guard
//! - [`bus`] - Injectable data-change event bus
//! - [`domain`] - Typed domain reads/writes that publish on change
//! - [`tracker`] - Connectivity and sync-queue status actor
//! - [`timer`] - Cancel-and-reschedule hide timer
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use barflow_store::{Database, DbConfig, FileLegacyStore};
//! use barflow_sync::{BarflowConfig, MigrationRunner};
//!
//! let config = BarflowConfig::load_or_default(None);
//! let db = Arc::new(Database::new(DbConfig::new(config.database_path())).await?);
//! let legacy = Arc::new(FileLegacyStore::new(config.legacy_dir()));
//!
//! MigrationRunner::new(legacy, db).run().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bus;
pub mod config;
pub mod domain;
pub mod error;
pub mod migration;
pub mod timer;
pub mod tracker;

// =============================================================================
// Re-exports
// =============================================================================

pub use bus::{EventBus, Subscription};
pub use config::{BarflowConfig, ConnectivitySettings, MigrationSettings, StorageSettings};
pub use domain::DomainStore;
pub use error::{SyncError, SyncResult};
pub use migration::{MigrationObserver, MigrationRunner, NoOpObserver};
pub use timer::HideTimer;
pub use tracker::{ConnectivitySignal, ConnectivityTracker, TrackerConfig, TrackerHandle};
