//! # Domain Types
//!
//! Core types shared by the store, migration and notification layers.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Namespace    │   │   DataDomain    │   │  ChangeEvent    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  storage key    │──►│  event topic    │──►│  domain         │       │
//! │  │  10 fixed keys  │   │  9 domains      │   │  "<d>Changed"   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  MigrationItem  │   │ MigrationRecord │   │MigrationOutcome │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  key            │   │  completed      │   │  Completed      │       │
//! │  │  value (JSON)   │   │  timestamp      │   │  AlreadyDone    │       │
//! │  └─────────────────┘   │  itemsCount     │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Namespace
// =============================================================================

/// One named category of persisted application data.
///
/// The set is closed: adding a namespace means adding a variant here and to
/// [`Namespace::ALL`]. There is no dynamic discovery of legacy keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum Namespace {
    Inventory,
    Sales,
    Staff,
    Categories,
    Settings,
    CashBalance,
    CashTransactions,
    Tables,
    InventoryHistory,
    /// First-run flag written by the UI once seed data exists.
    #[serde(rename = "app_initialized")]
    AppInitialized,
}

impl Namespace {
    /// Every namespace the migration copies, in copy order.
    pub const ALL: [Namespace; 10] = [
        Namespace::Inventory,
        Namespace::Sales,
        Namespace::Staff,
        Namespace::Categories,
        Namespace::Settings,
        Namespace::CashBalance,
        Namespace::CashTransactions,
        Namespace::Tables,
        Namespace::InventoryHistory,
        Namespace::AppInitialized,
    ];

    /// The exact storage key used by both stores.
    pub const fn key(&self) -> &'static str {
        match self {
            Namespace::Inventory => "inventory",
            Namespace::Sales => "sales",
            Namespace::Staff => "staff",
            Namespace::Categories => "categories",
            Namespace::Settings => "settings",
            Namespace::CashBalance => "cashBalance",
            Namespace::CashTransactions => "cashTransactions",
            Namespace::Tables => "tables",
            Namespace::InventoryHistory => "inventoryHistory",
            Namespace::AppInitialized => "app_initialized",
        }
    }

    /// The data domain whose change event covers this namespace.
    ///
    /// `None` for the initialization flag, which nobody subscribes to.
    pub const fn domain(&self) -> Option<DataDomain> {
        match self {
            Namespace::Inventory => Some(DataDomain::Inventory),
            Namespace::Sales => Some(DataDomain::Sales),
            Namespace::Staff => Some(DataDomain::Staff),
            Namespace::Categories => Some(DataDomain::Categories),
            Namespace::Settings => Some(DataDomain::Settings),
            Namespace::CashBalance => Some(DataDomain::CashBalance),
            Namespace::CashTransactions => Some(DataDomain::CashTransactions),
            Namespace::Tables => Some(DataDomain::Tables),
            Namespace::InventoryHistory => Some(DataDomain::InventoryHistory),
            Namespace::AppInitialized => None,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Namespace {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::ALL
            .iter()
            .copied()
            .find(|ns| ns.key() == s)
            .ok_or_else(|| CoreError::UnknownNamespace(s.to_string()))
    }
}

// =============================================================================
// Data Domain
// =============================================================================

/// Business area a change notification pertains to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum DataDomain {
    Inventory,
    Sales,
    Staff,
    Categories,
    Settings,
    CashBalance,
    CashTransactions,
    Tables,
    InventoryHistory,
}

impl DataDomain {
    /// Every domain, in declaration order.
    pub const ALL: [DataDomain; 9] = [
        DataDomain::Inventory,
        DataDomain::Sales,
        DataDomain::Staff,
        DataDomain::Categories,
        DataDomain::Settings,
        DataDomain::CashBalance,
        DataDomain::CashTransactions,
        DataDomain::Tables,
        DataDomain::InventoryHistory,
    ];

    /// The domain's name as used in storage keys.
    pub const fn name(&self) -> &'static str {
        self.namespace().key()
    }

    /// The change event name consumers listen for: `<domain>Changed`.
    pub const fn event_name(&self) -> &'static str {
        match self {
            DataDomain::Inventory => "inventoryChanged",
            DataDomain::Sales => "salesChanged",
            DataDomain::Staff => "staffChanged",
            DataDomain::Categories => "categoriesChanged",
            DataDomain::Settings => "settingsChanged",
            DataDomain::CashBalance => "cashBalanceChanged",
            DataDomain::CashTransactions => "cashTransactionsChanged",
            DataDomain::Tables => "tablesChanged",
            DataDomain::InventoryHistory => "inventoryHistoryChanged",
        }
    }

    /// The storage namespace backing this domain.
    pub const fn namespace(&self) -> Namespace {
        match self {
            DataDomain::Inventory => Namespace::Inventory,
            DataDomain::Sales => Namespace::Sales,
            DataDomain::Staff => Namespace::Staff,
            DataDomain::Categories => Namespace::Categories,
            DataDomain::Settings => Namespace::Settings,
            DataDomain::CashBalance => Namespace::CashBalance,
            DataDomain::CashTransactions => Namespace::CashTransactions,
            DataDomain::Tables => Namespace::Tables,
            DataDomain::InventoryHistory => Namespace::InventoryHistory,
        }
    }
}

impl fmt::Display for DataDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataDomain {
    type Err = CoreError;

    /// Accepts either the domain name (`"staff"`) or its event name
    /// (`"staffChanged"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataDomain::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s || d.event_name() == s)
            .ok_or_else(|| CoreError::UnknownDomain(s.to_string()))
    }
}

// =============================================================================
// Change Event
// =============================================================================

/// Pure invalidation signal: "the data behind this domain changed".
///
/// Carries no payload. Subscribers re-read from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChangeEvent {
    /// Domain whose backing data changed.
    pub domain: DataDomain,
}

impl ChangeEvent {
    /// Creates the change event for a domain.
    pub const fn new(domain: DataDomain) -> Self {
        ChangeEvent { domain }
    }

    /// The event topic, e.g. `"inventoryChanged"`.
    pub const fn topic(&self) -> &'static str {
        self.domain.event_name()
    }
}

// =============================================================================
// Migration Types
// =============================================================================

/// One namespace's value on its way from the legacy store to the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationItem {
    /// Namespace key (one of [`Namespace::key`]).
    pub key: String,

    /// The stored JSON value, copied verbatim.
    pub value: Value,
}

impl MigrationItem {
    /// Creates an item for a namespace.
    pub fn new(namespace: Namespace, value: Value) -> Self {
        MigrationItem {
            key: namespace.key().to_string(),
            value,
        }
    }
}

/// Completion marker persisted once the migration has run.
///
/// Stored as JSON under [`crate::MIGRATION_MARKER_KEY`]:
/// `{"completed":true,"timestamp":"2026-01-01T00:00:00Z","itemsCount":2}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MigrationRecord {
    /// Always true once persisted. Older markers without it still count.
    #[serde(default = "default_completed")]
    pub completed: bool,

    /// When the migration finished (ISO-8601, UTC).
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// Number of namespaces copied.
    pub items_count: u32,
}

fn default_completed() -> bool {
    true
}

impl MigrationRecord {
    /// Creates a completed record stamped with the given time.
    pub fn completed_at(timestamp: DateTime<Utc>, items_count: u32) -> Self {
        MigrationRecord {
            completed: true,
            timestamp,
            items_count,
        }
    }
}

/// Result of a successful migration activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The marker was already present; nothing was read or written.
    AlreadyCompleted,

    /// This activation copied the data and wrote the marker.
    Completed(MigrationRecord),
}

impl MigrationOutcome {
    /// Returns the record written by this activation, if any.
    pub fn record(&self) -> Option<&MigrationRecord> {
        match self {
            MigrationOutcome::AlreadyCompleted => None,
            MigrationOutcome::Completed(record) => Some(record),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_namespace_keys_are_fixed() {
        let keys: Vec<&str> = Namespace::ALL.iter().map(Namespace::key).collect();
        assert_eq!(
            keys,
            vec![
                "inventory",
                "sales",
                "staff",
                "categories",
                "settings",
                "cashBalance",
                "cashTransactions",
                "tables",
                "inventoryHistory",
                "app_initialized",
            ]
        );
    }

    #[test]
    fn test_namespace_parse() {
        assert_eq!("cashBalance".parse::<Namespace>().unwrap(), Namespace::CashBalance);
        assert_eq!(
            "app_initialized".parse::<Namespace>().unwrap(),
            Namespace::AppInitialized
        );
        assert!("migration_completed".parse::<Namespace>().is_err());
    }

    #[test]
    fn test_namespace_serde_matches_key() {
        for ns in Namespace::ALL {
            let encoded = serde_json::to_value(ns).unwrap();
            assert_eq!(encoded, json!(ns.key()));
        }
    }

    #[test]
    fn test_event_names() {
        assert_eq!(DataDomain::Inventory.event_name(), "inventoryChanged");
        assert_eq!(DataDomain::Staff.event_name(), "staffChanged");
        assert_eq!(
            DataDomain::InventoryHistory.event_name(),
            "inventoryHistoryChanged"
        );
        for domain in DataDomain::ALL {
            assert_eq!(domain.event_name(), format!("{}Changed", domain.name()));
        }
    }

    #[test]
    fn test_domain_namespace_roundtrip() {
        for domain in DataDomain::ALL {
            assert_eq!(domain.namespace().domain(), Some(domain));
        }
        assert_eq!(Namespace::AppInitialized.domain(), None);
    }

    #[test]
    fn test_domain_parse_accepts_event_name() {
        assert_eq!("tables".parse::<DataDomain>().unwrap(), DataDomain::Tables);
        assert_eq!("tablesChanged".parse::<DataDomain>().unwrap(), DataDomain::Tables);
        assert!("app_initialized".parse::<DataDomain>().is_err());
    }

    #[test]
    fn test_change_event_topic() {
        let event = ChangeEvent::new(DataDomain::CashTransactions);
        assert_eq!(event.topic(), "cashTransactionsChanged");
    }

    #[test]
    fn test_change_event_wire_shape() {
        let event = ChangeEvent::new(DataDomain::Inventory);
        assert_eq!(serde_json::to_value(event).unwrap(), json!({"domain": "inventory"}));

        let parsed: ChangeEvent =
            serde_json::from_value(json!({"domain": "cashTransactions"})).unwrap();
        assert_eq!(parsed, ChangeEvent::new(DataDomain::CashTransactions));
    }

    #[test]
    fn test_migration_record_wire_shape() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let record = MigrationRecord::completed_at(ts, 2);
        let encoded = serde_json::to_value(&record).unwrap();

        assert_eq!(encoded["completed"], json!(true));
        assert_eq!(encoded["itemsCount"], json!(2));
        assert_eq!(encoded["timestamp"], json!("2026-03-01T12:00:00Z"));
    }

    #[test]
    fn test_migration_record_without_completed_flag() {
        let record: MigrationRecord =
            serde_json::from_value(json!({"timestamp": "2026-03-01T12:00:00Z", "itemsCount": 0}))
                .unwrap();
        assert!(record.completed);
        assert_eq!(record.items_count, 0);
    }

    #[test]
    fn test_outcome_record() {
        assert!(MigrationOutcome::AlreadyCompleted.record().is_none());
        let record = MigrationRecord::completed_at(Utc::now(), 3);
        let outcome = MigrationOutcome::Completed(record.clone());
        assert_eq!(outcome.record(), Some(&record));
    }
}
