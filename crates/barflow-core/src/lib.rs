//! # barflow-core: Pure Types for the BarFlow Local Data Layer
//!
//! This crate holds the domain model shared by the storage, migration and
//! connectivity crates. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     BarFlow Local Data Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web UI (inventory, sales, staff...)          │   │
//! │  │    re-reads on "<domain>Changed" ◄── reads status snapshots     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   barflow-sync: MigrationRunner • EventBus • Tracker            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ barflow-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌──────────────┐  ┌───────────────────────┐  │   │
//! │  │   │   types    │  │    status    │  │        error          │  │   │
//! │  │   │ Namespace  │  │ Notification │  │ CoreError             │  │   │
//! │  │   │ DataDomain │  │ State        │  │                       │  │   │
//! │  │   │ Migration* │  │ SyncIndicator│  │                       │  │   │
//! │  │   └────────────┘  └──────────────┘  └───────────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO TIMERS • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Namespaces, data domains, migration records, change events
//! - [`status`] - Connectivity/sync status and the notification state machine
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use barflow_core::{DataDomain, Namespace};
//!
//! assert_eq!(Namespace::ALL.len(), 10);
//! assert_eq!(DataDomain::Inventory.event_name(), "inventoryChanged");
//! assert_eq!(DataDomain::CashBalance.namespace().key(), "cashBalance");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod status;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult};
pub use status::{
    ConnectivityNotice, ConnectivityStatus, NotificationState, SyncIndicator, SyncQueueSnapshot,
    TimerAction,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Reserved key holding the migration completion marker in the target store.
///
/// Never listed in [`Namespace::ALL`], so the migration never copies it.
pub const MIGRATION_MARKER_KEY: &str = "migration_completed";

/// Default visibility window for connectivity notifications (milliseconds).
pub const DEFAULT_NOTIFICATION_MS: u64 = 5_000;
