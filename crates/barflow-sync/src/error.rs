//! # Sync Error Types
//!
//! Error types for migration, notification and configuration operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Migration     │  │     Runtime             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  MigrationWrite │  │  Internal               │ │
//! │  │  ConfigLoad...  │  │  (fatal, retry  │  │  (tracker task          │ │
//! │  │  ConfigSave...  │  │   on next run)  │  │   join failure)         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Storage      │  │  Serialization  │                              │
//! │  │  Store(..)      │  │  Serialization  │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use barflow_store::StoreError;
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all failures of this crate.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Migration Errors
    // =========================================================================
    /// The batch write or the marker write failed. No marker was persisted,
    /// so the next activation retries the whole migration.
    #[error("Migration write failed: {0}")]
    MigrationWrite(#[source] StoreError),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// A store operation outside the migration failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A domain value could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if a later attempt may succeed.
    ///
    /// ## Retryable Errors
    /// - Migration writes (the marker was not written)
    /// - Transient store failures (pool exhausted, connection)
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::MigrationWrite(_) => true,
            SyncError::Store(store) => matches!(
                store,
                StoreError::PoolExhausted
                    | StoreError::ConnectionFailed(_)
                    | StoreError::TransactionFailed(_)
            ),
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::MigrationWrite(StoreError::QueryFailed("disk I/O error".into()))
            .is_retryable());
        assert!(SyncError::Store(StoreError::PoolExhausted).is_retryable());

        assert!(!SyncError::InvalidConfig("bad".into()).is_retryable());
        assert!(!SyncError::Store(StoreError::Serialization("x".into())).is_retryable());
    }

    #[test]
    fn test_config_errors() {
        assert!(SyncError::ConfigLoadFailed("missing".into()).is_config_error());
        assert!(!SyncError::Internal("join".into()).is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::MigrationWrite(StoreError::TransactionFailed("locked".into()));
        assert_eq!(
            err.to_string(),
            "Migration write failed: Transaction failed: locked"
        );
    }
}
