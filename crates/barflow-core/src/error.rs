//! # Error Types
//!
//! Domain-specific error types for barflow-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  barflow-core errors (this file)                                       │
//! │  └── CoreError        - Unknown namespace / domain names               │
//! │                                                                         │
//! │  barflow-store errors (separate crate)                                 │
//! │  └── StoreError       - Legacy read and database failures              │
//! │                                                                         │
//! │  barflow-sync errors (separate crate)                                  │
//! │  └── SyncError        - Migration, config and channel failures         │
//! │                                                                         │
//! │  Flow: CoreError → StoreError → SyncError → host logs                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Core domain errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A storage key that is not one of the fixed namespaces.
    ///
    /// ## When This Occurs
    /// - Parsing a key read from configuration or a seed file
    /// - A typo such as `"inventry"`
    #[error("Unknown namespace: '{0}'")]
    UnknownNamespace(String),

    /// A domain name that has no change event.
    #[error("Unknown data domain: '{0}'")]
    UnknownDomain(String),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnknownNamespace("inventry".to_string());
        assert_eq!(err.to_string(), "Unknown namespace: 'inventry'");

        let err = CoreError::UnknownDomain("app_initialized".to_string());
        assert_eq!(err.to_string(), "Unknown data domain: 'app_initialized'");
    }
}
