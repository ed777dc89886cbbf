//! # Store Error Types
//!
//! Error types for legacy and embedded storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Legacy file read / JSON parse        SQLite Error (sqlx::Error)       │
//! │       │                                    │                            │
//! │       ▼                                    ▼                            │
//! │  StoreError::ReadFailure            StoreError (categorized)           │
//! │       │                                    │                            │
//! │       ▼                                    ▼                            │
//! │  skipped by the migration           SyncError::MigrationWrite          │
//! │  (logged, per key)                  (fatal to this attempt)            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A single key could not be read or decoded.
    ///
    /// ## When This Occurs
    /// - Legacy file holds truncated or hand-edited JSON
    /// - File permissions prevent reading one key
    ///
    /// Scoped to one key: other keys remain readable.
    #[error("Failed to read '{key}': {reason}")]
    ReadFailure { key: String, reason: String },

    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed (batch write rolled back).
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A value could not be encoded as JSON.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Filesystem error outside a single key read.
    #[error("I/O error: {0}")]
    Io(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a ReadFailure for a key.
    pub fn read_failure(key: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::ReadFailure {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → StoreError::QueryFailed (constraint text kept)
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// sqlx::Error::PoolClosed     → StoreError::ConnectionFailed
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_failure_message() {
        let err = StoreError::read_failure("sales", "expected value at line 1 column 1");
        assert_eq!(
            err.to_string(),
            "Failed to read 'sales': expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_sqlx_pool_errors() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::PoolExhausted
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolClosed),
            StoreError::ConnectionFailed(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::NotFound { .. }
        ));
    }
}
