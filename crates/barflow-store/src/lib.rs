//! # barflow-store: Storage Layer for BarFlow Track
//!
//! This crate provides both local stores the app has used:
//! the legacy synchronous key-value store, and the embedded async SQLite
//! store that replaces it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BarFlow Storage                                  │
//! │                                                                         │
//! │  MigrationRunner / DomainStore (barflow-sync)                          │
//! │       │                               │                                 │
//! │       ▼ load(key)                     ▼ get / set / set_batch           │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   barflow-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ LegacyStore   │    │ KeyValueStore │    │  Migrations  │  │   │
//! │  │   │ (legacy.rs)   │    │ (pool.rs)     │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ <key>.json    │    │ Database      │    │ 001_kv_store │  │   │
//! │  │   │ files         │    │ MemoryStore   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  legacy/ directory              barflow.db (WAL)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - `LegacyStore` and `KeyValueStore` contracts
//! - [`legacy`] - File and in-memory legacy stores
//! - [`memory`] - In-memory `KeyValueStore`
//! - [`pool`] - SQLite pool and the `Database` store
//! - [`migrations`] - Embedded schema migrations
//! - [`repository`] - SQL for the key-value table
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use barflow_store::{Database, DbConfig, KeyValueStore};
//!
//! let db = Database::new(DbConfig::new("barflow.db")).await?;
//! db.set("inventory", &serde_json::json!([])).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod legacy;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use legacy::{FileLegacyStore, MemoryLegacyStore};
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};
pub use repository::kv::KvRepository;
pub use store::{KeyValueStore, LegacyStore};
