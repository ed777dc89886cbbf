//! # Configuration
//!
//! Configuration for storage locations, the one-time migration and the
//! connectivity notification window.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BARFLOW_DATA_DIR=/srv/barflow                                      │
//! │     BARFLOW_NOTIFICATION_MS=3000                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/barflow-track/config.toml (Linux)                        │
//! │     ~/Library/Application Support/com.barflow.track/config.toml        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     platform data dir, migration enabled, 5000 ms window               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! data_dir = "/var/lib/barflow"
//! legacy_dir = "/var/lib/barflow/legacy"
//! database_file = "barflow.db"
//!
//! [migration]
//! enabled = true
//!
//! [connectivity]
//! notification_ms = 5000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use barflow_core::DEFAULT_NOTIFICATION_MS;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the two stores live on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Root data directory. Defaults to the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Directory of the legacy key-value files.
    /// Defaults to `<data_dir>/legacy`.
    #[serde(default)]
    pub legacy_dir: Option<PathBuf>,

    /// SQLite file name, relative to `data_dir`.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_database_file() -> String {
    "barflow.db".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            data_dir: None,
            legacy_dir: None,
            database_file: default_database_file(),
        }
    }
}

// =============================================================================
// Migration Settings
// =============================================================================

/// One-time legacy migration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationSettings {
    /// Run the migration at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MigrationSettings {
    fn default() -> Self {
        MigrationSettings { enabled: true }
    }
}

// =============================================================================
// Connectivity Settings
// =============================================================================

/// Connectivity notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivitySettings {
    /// How long a connectivity notification stays visible (milliseconds).
    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,
}

fn default_notification_ms() -> u64 {
    DEFAULT_NOTIFICATION_MS
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        ConnectivitySettings {
            notification_ms: default_notification_ms(),
        }
    }
}

impl ConnectivitySettings {
    /// The notification window as a `Duration`.
    pub fn notification_window(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configuration for the local data layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarflowConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub migration: MigrationSettings,

    #[serde(default)]
    pub connectivity: ConnectivitySettings,
}

impl BarflowConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.storage.database_file.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "database_file must not be empty".into(),
            ));
        }

        if self.connectivity.notification_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "notification_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("BARFLOW_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data dir from environment");
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(dir) = std::env::var("BARFLOW_LEGACY_DIR") {
            debug!(legacy_dir = %dir, "Overriding legacy dir from environment");
            self.storage.legacy_dir = Some(PathBuf::from(dir));
        }

        if let Ok(file) = std::env::var("BARFLOW_DATABASE_FILE") {
            self.storage.database_file = file;
        }

        if let Ok(enabled) = std::env::var("BARFLOW_MIGRATION_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.migration.enabled = true,
                "0" | "false" | "no" => self.migration.enabled = false,
                _ => warn!(value = %enabled, "Unknown BARFLOW_MIGRATION_ENABLED value"),
            }
        }

        if let Ok(ms) = std::env::var("BARFLOW_NOTIFICATION_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.connectivity.notification_ms = ms,
                Err(_) => warn!(value = %ms, "Invalid BARFLOW_NOTIFICATION_MS value"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "barflow", "track")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Resolved Paths
    // =========================================================================

    /// Resolved data directory: configured, else the platform data dir,
    /// else the working directory.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("com", "barflow", "track")
                    .map(|dirs| dirs.data_dir().to_path_buf())
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolved legacy store directory.
    pub fn legacy_dir(&self) -> PathBuf {
        self.storage
            .legacy_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("legacy"))
    }

    /// Resolved SQLite file path.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.database_file)
    }
}
