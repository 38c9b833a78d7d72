//! In-memory store, mainly for tests and ephemeral sessions.

use crate::{
    error::{KvStoreError, Result},
    policy::QuotaPolicy,
    store::{BoundedMap, KeyValueStore, StoreStats},
};
use std::sync::RwLock;

/// Process-local store with a byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<BoundedMap>,
}

impl MemoryStore {
    /// Create a store with the default 5MB quota.
    #[must_use]
    pub fn new() -> Self {
        Self::with_quota(QuotaPolicy::new())
    }

    /// Create a store with a specific quota.
    #[must_use]
    pub fn with_quota(policy: QuotaPolicy) -> Self {
        Self {
            inner: RwLock::new(BoundedMap::new(policy)),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.inner.read().map_err(|_| KvStoreError::LockPoisoned)?;
        Ok(map.get(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.inner.write().map_err(|_| KvStoreError::LockPoisoned)?;
        map.set(key, value)?;
        tracing::trace!("Stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.inner.write().map_err(|_| KvStoreError::LockPoisoned)?;
        map.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let map = self.inner.read().map_err(|_| KvStoreError::LockPoisoned)?;
        Ok(map.keys())
    }

    fn stats(&self) -> Result<StoreStats> {
        let map = self.inner.read().map_err(|_| KvStoreError::LockPoisoned)?;
        Ok(map.stats())
    }
}
