//! # Legacy Key-Value Stores
//!
//! Readers for the data the previous build kept in plain key-value storage.
//!
//! ## On-Disk Layout (FileLegacyStore)
//! ```text
//! legacy/
//! ├── inventory.json          ← one JSON document per key
//! ├── staff.json
//! ├── cashBalance.json
//! └── app_initialized.json
//! ```
//!
//! Reads are synchronous and per key. A corrupt file fails only its own key.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::LegacyStore;

// =============================================================================
// File-backed legacy store
// =============================================================================

/// Legacy store backed by a directory of `<key>.json` files.
#[derive(Debug, Clone)]
pub struct FileLegacyStore {
    root: PathBuf,
}

impl FileLegacyStore {
    /// Opens a legacy store rooted at `root`. The directory need not exist;
    /// a missing directory simply holds no keys.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileLegacyStore { root: root.into() }
    }

    /// Directory holding the key files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl LegacyStore for FileLegacyStore {
    fn load(&self, key: &str) -> StoreResult<Option<Value>> {
        let path = self.path_for(key);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key, "Legacy key absent");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::read_failure(key, e)),
        };

        parse_value(key, &raw)
    }

    fn save(&self, key: &str, value: &Value) -> StoreResult<()> {
        fs::create_dir_all(&self.root)?;
        let contents = serde_json::to_string_pretty(value)?;
        fs::write(self.path_for(key), contents)?;
        Ok(())
    }
}

// =============================================================================
// In-memory legacy store
// =============================================================================

/// Legacy store holding raw strings in memory, parsed on every load like
/// browser local storage.
#[derive(Debug, Default)]
pub struct MemoryLegacyStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryLegacyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw string without validating it. Lets callers plant corrupt
    /// data for a key.
    pub fn insert_raw(&self, key: impl Into<String>, raw: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), raw.into());
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LegacyStore for MemoryLegacyStore {
    fn load(&self, key: &str) -> StoreResult<Option<Value>> {
        let raw = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();

        match raw {
            Some(raw) => parse_value(key, &raw),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, value: &Value) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.insert_raw(key, raw);
        Ok(())
    }
}

/// Parses one stored document. JSON `null` counts as absent.
fn parse_value(key: &str, raw: &str) -> StoreResult<Option<Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(StoreError::read_failure(key, e)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
