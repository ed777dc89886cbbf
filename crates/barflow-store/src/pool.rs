//! # Database Pool Management
//!
//! Connection pool creation and configuration for the embedded SQLite store.
//!
//! One process owns one database file. Everything the app keeps locally
//! lives in a single `kv_store` table, so the pool is small: a few readers
//! for UI loads and the occasional batch write from the legacy migration.
//!
//! ```text
//! DbConfig::new(path)
//!     └──► Database::new(config)
//!              ├── open file (create if missing), WAL, synchronous=NORMAL
//!              ├── SqlitePool (1..=max_connections)
//!              └── schema migrations, unless disabled
//! ```
//!
//! ## WAL Mode
//! SQLite WAL mode is enabled so UI reads never block a batch write.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use barflow_core::MigrationItem;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::kv::KvRepository;
use crate::store::KeyValueStore;

// =============================================================================
// Configuration
// =============================================================================

/// How long a caller waits for a free connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Idle connections above the minimum of one are closed after this.
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Where the store lives and how it is opened.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Pool size; `:memory:` databases must use 1, each connection would
    /// otherwise see its own empty database.
    pub max_connections: u32,

    /// Apply pending schema migrations while opening.
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed store at `path`, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            run_migrations: true,
        }
    }

    /// Private in-memory store, gone when the pool closes.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            run_migrations: true,
        }
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }
}

// =============================================================================
// Database
// =============================================================================

/// Embedded store handle: pool plus repository access.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Opens the store described by `config`.
    ///
    /// Fails with `ConnectionFailed` when the file cannot be opened and
    /// `MigrationFailed` when a schema migration does not apply.
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing embedded store"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            // Safe from corruption, may lose the last transaction on power loss
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .idle_timeout(Some(IDLE_TIMEOUT))
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs schema migrations. Idempotent.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the key-value repository.
    pub fn kv(&self) -> KvRepository {
        KvRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all store operations fail with
    /// `StoreError::ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        self.kv().get(key).await
    }

    async fn set(&self, key: &str, value: &Value) -> StoreResult<()> {
        self.kv().set(key, value).await
    }

    async fn set_batch(&self, items: &[MigrationItem]) -> StoreResult<()> {
        self.kv().set_batch(items).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use barflow_core::Namespace;
    use serde_json::json;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = test_db().await;
        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[test]
    fn test_config_defaults() {
        let config = DbConfig::new("/tmp/barflow.db").run_migrations(false);
        assert_eq!(config.max_connections, 5);
        assert!(!config.run_migrations);

        assert_eq!(DbConfig::in_memory().max_connections, 1);
    }

    #[tokio::test]
    async fn test_in_memory_pool_is_single_connection() {
        let db = test_db().await;
        assert_eq!(db.pool().options().get_max_connections(), 1);
        assert_eq!(db.pool().options().get_min_connections(), 1);
    }

    #[tokio::test]
    async fn test_get_set_roundtrip() {
        let db = test_db().await;
        assert_eq!(db.get("inventory").await.unwrap(), None);

        let value = json!([{"name": "IPA", "stock": 24}]);
        db.set("inventory", &value).await.unwrap();
        assert_eq!(db.get("inventory").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn test_batch_upserts() {
        let db = test_db().await;
        db.set("staff", &json!(["stale"])).await.unwrap();

        let items = vec![
            MigrationItem::new(Namespace::Staff, json!(["Ana", "Ben"])),
            MigrationItem::new(Namespace::CashBalance, json!(310.25)),
        ];
        db.set_batch(&items).await.unwrap();
        db.set_batch(&items).await.unwrap();

        assert_eq!(db.kv().count().await.unwrap(), 2);
        assert_eq!(db.get("staff").await.unwrap(), Some(json!(["Ana", "Ben"])));
        assert_eq!(db.kv().keys().await.unwrap(), vec!["cashBalance", "staff"]);
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let db = test_db().await;

        // The empty key violates the table CHECK and aborts the transaction
        let items = vec![
            MigrationItem::new(Namespace::Tables, json!([{"id": 1}])),
            MigrationItem {
                key: String::new(),
                value: json!(true),
            },
        ];
        let err = db.set_batch(&items).await.unwrap_err();
        assert!(matches!(err, StoreError::QueryFailed(_)));

        assert_eq!(db.get("tables").await.unwrap(), None);
        assert_eq!(db.kv().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        db.set("settings", &json!({"currency": "EUR"})).await.unwrap();

        assert!(db.kv().delete("settings").await.unwrap());
        assert!(!db.kv().delete("settings").await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_pool_fails() {
        let db = test_db().await;
        db.close().await;

        let err = db.get("sales").await.unwrap_err();
        assert!(matches!(err, StoreError::ConnectionFailed(_)));
    }
}
