//! # Repository Module
//!
//! Database repository implementations for the embedded store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  MigrationRunner / DomainStore                                         │
//! │       │                                                                 │
//! │       │  store.set_batch(items)   (KeyValueStore trait)                │
//! │       ▼                                                                 │
//! │  Database ──► db.kv()                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  KvRepository                                                          │
//! │  ├── get(&self, key)                                                   │
//! │  ├── set(&self, key, value)                                            │
//! │  ├── set_batch(&self, items)                                           │
//! │  └── delete / keys / count                                             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database (kv_store)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`KvRepository`](kv::KvRepository) - Key-value documents

pub mod kv;
