//! # In-Memory Key-Value Store
//!
//! `KeyValueStore` held in a `HashMap`. Used by tests and by hosts that run
//! without a database file.

use std::collections::HashMap;

use async_trait::async_trait;
use barflow_core::MigrationItem;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::store::KeyValueStore;

/// Async key-value store kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Removes a key, returning its previous value.
    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.entries.write().await.remove(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> StoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    /// Applies the batch under a single write lock, so readers never observe
    /// half of it.
    async fn set_batch(&self, items: &[MigrationItem]) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        for item in items {
            entries.insert(item.key.clone(), item.value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barflow_core::Namespace;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        assert_eq!(store.get("tables").await.unwrap(), None);

        store.set("tables", &json!([{"id": 1}])).await.unwrap();
        assert_eq!(store.get("tables").await.unwrap(), Some(json!([{"id": 1}])));
    }

    #[tokio::test]
    async fn test_batch_overwrites() {
        let store = MemoryStore::new();
        store.set("staff", &json!(["old"])).await.unwrap();

        let items = vec![
            MigrationItem::new(Namespace::Staff, json!(["new"])),
            MigrationItem::new(Namespace::Sales, json!([])),
        ];
        store.set_batch(&items).await.unwrap();
        store.set_batch(&items).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("staff").await.unwrap(), Some(json!(["new"])));
    }
}
