//! End-to-end flow: legacy files on disk, SQLite target, migration, then
//! domain writes fanning out over the bus.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use barflow_core::{DataDomain, MigrationOutcome, Namespace};
use barflow_store::{Database, DbConfig, FileLegacyStore, KeyValueStore, LegacyStore};
use barflow_sync::{DomainStore, EventBus, MigrationRunner};
use serde_json::json;

fn seeded_legacy(dir: &std::path::Path) -> FileLegacyStore {
    let legacy = FileLegacyStore::new(dir);
    legacy
        .save(
            Namespace::Inventory.key(),
            &json!([
                {"id": 1, "name": "House Lager", "stock": 48},
                {"id": 2, "name": "Negroni", "stock": 20},
                {"id": 3, "name": "Cola", "stock": 72},
            ]),
        )
        .unwrap();
    legacy
        .save(
            Namespace::Staff.key(),
            &json!([
                {"id": 1, "name": "Ana", "role": "bartender"},
                {"id": 2, "name": "Dev", "role": "manager"},
            ]),
        )
        .unwrap();
    legacy
}

#[tokio::test]
async fn test_legacy_files_migrate_into_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = Arc::new(seeded_legacy(dir.path()));
    let db = Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());

    let runner = MigrationRunner::new(legacy.clone(), db.clone());

    let outcome = runner.run().await.unwrap();
    let record = outcome.record().unwrap();
    assert!(record.completed);
    assert_eq!(record.items_count, 2);

    for ns in [Namespace::Inventory, Namespace::Staff] {
        assert_eq!(
            db.get(ns.key()).await.unwrap(),
            legacy.load(ns.key()).unwrap(),
            "{ns} should match the legacy value"
        );
    }
    assert_eq!(db.get(Namespace::Sales.key()).await.unwrap(), None);

    let marker = runner.marker().await.unwrap().unwrap();
    assert_eq!(marker.items_count, 2);

    assert_eq!(runner.run().await.unwrap(), MigrationOutcome::AlreadyCompleted);
    assert_eq!(db.kv().count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_corrupt_legacy_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = Arc::new(seeded_legacy(dir.path()));
    std::fs::write(dir.path().join("sales.json"), "{\"truncated\": ").unwrap();

    let db = Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());
    let outcome = MigrationRunner::new(legacy, db.clone()).run().await.unwrap();

    assert_eq!(outcome.record().unwrap().items_count, 2);
    assert_eq!(db.get("sales").await.unwrap(), None);
}

#[tokio::test]
async fn test_migrated_data_flows_through_domain_store() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = Arc::new(seeded_legacy(dir.path()));
    let db = Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());
    MigrationRunner::new(legacy, db.clone()).run().await.unwrap();

    let bus = Arc::new(EventBus::new());
    let domains = DomainStore::new(db.clone(), bus.clone());

    let changes = Arc::new(AtomicUsize::new(0));
    let changes_clone = Arc::clone(&changes);
    let _sub = bus.subscribe(DataDomain::Inventory, move |event| {
        assert_eq!(event.topic(), "inventoryChanged");
        changes_clone.fetch_add(1, Ordering::SeqCst);
    });

    let mut inventory: Vec<serde_json::Value> =
        domains.load(DataDomain::Inventory).await.unwrap().unwrap();
    assert_eq!(inventory.len(), 3);

    inventory.push(json!({"id": 4, "name": "Stout", "stock": 18}));
    domains.save(DataDomain::Inventory, &inventory).await.unwrap();
    assert_eq!(changes.load(Ordering::SeqCst), 1);

    let reloaded: Vec<serde_json::Value> =
        domains.load(DataDomain::Inventory).await.unwrap().unwrap();
    assert_eq!(reloaded.len(), 4);

    // Saving another domain does not reach inventory subscribers
    domains.save(DataDomain::Staff, &json!([])).await.unwrap();
    assert_eq!(changes.load(Ordering::SeqCst), 1);
}
