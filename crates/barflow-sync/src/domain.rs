//! # Domain Store
//!
//! Typed reads and writes of domain data, with a change event after every
//! successful write. This is the write-then-publish path the UI uses:
//!
//! ```text
//! save(Inventory, &items) ──► store.set("inventory") ──► bus.publish(Inventory)
//!                                      │ error
//!                                      └──► Err, nothing published
//! ```

use std::sync::Arc;

use barflow_core::{DataDomain, Namespace};
use barflow_store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::bus::EventBus;
use crate::error::SyncResult;

/// Typed access to domain data backed by a [`KeyValueStore`].
#[derive(Clone)]
pub struct DomainStore {
    store: Arc<dyn KeyValueStore>,
    bus: Arc<EventBus>,
}

impl DomainStore {
    pub fn new(store: Arc<dyn KeyValueStore>, bus: Arc<EventBus>) -> Self {
        DomainStore { store, bus }
    }

    /// The bus changes are published on.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Reads and decodes a domain's value.
    pub async fn load<T: DeserializeOwned>(&self, domain: DataDomain) -> SyncResult<Option<T>> {
        match self.store.get(domain.namespace().key()).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Writes a domain's value and notifies its subscribers.
    pub async fn save<T: Serialize>(&self, domain: DataDomain, value: &T) -> SyncResult<()> {
        let value = serde_json::to_value(value)?;
        self.store.set(domain.namespace().key(), &value).await?;

        let notified = self.bus.publish(domain);
        debug!(%domain, notified, "Domain saved");
        Ok(())
    }

    /// Records that first-run initialization has happened.
    pub async fn mark_initialized(&self) -> SyncResult<()> {
        self.store
            .set(Namespace::AppInitialized.key(), &Value::Bool(true))
            .await?;
        Ok(())
    }

    /// True once [`DomainStore::mark_initialized`] has run (or the flag was
    /// migrated from the legacy store).
    pub async fn is_initialized(&self) -> SyncResult<bool> {
        let flag = self.store.get(Namespace::AppInitialized.key()).await?;
        Ok(matches!(flag, Some(Value::Bool(true))))
    }
}
