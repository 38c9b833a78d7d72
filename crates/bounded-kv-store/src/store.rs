//! The store trait and the bounded map shared by its implementations.

use crate::{
    error::{KvStoreError, Result},
    policy::QuotaPolicy,
};
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};

/// Usage statistics for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_keys: usize,
    pub used_bytes: usize,
    pub max_bytes: Option<usize>,
}

/// A synchronous, string-keyed store with a finite capacity.
///
/// Methods take `&self`; implementations use interior locking so a store can be
/// shared between components behind an `Arc`.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite `key`.
    ///
    /// # Errors
    /// Returns [`KvStoreError::QuotaExceeded`] when the write would exceed capacity.
    /// The previous value is left untouched in that case.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently present, in sorted order.
    fn keys(&self) -> Result<Vec<String>>;

    /// Current usage.
    fn stats(&self) -> Result<StoreStats>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn stats(&self) -> Result<StoreStats> {
        (**self).stats()
    }
}

/// Sorted map that tracks its own byte usage against a [`QuotaPolicy`].
#[derive(Debug, Clone, Default)]
pub(crate) struct BoundedMap {
    entries: BTreeMap<String, String>,
    used_bytes: usize,
    policy: QuotaPolicy,
}

impl BoundedMap {
    pub(crate) fn new(policy: QuotaPolicy) -> Self {
        Self {
            entries: BTreeMap::new(),
            used_bytes: 0,
            policy,
        }
    }

    /// Build from existing entries. Entries are accepted even if they exceed the
    /// policy; only subsequent writes are checked.
    pub(crate) fn from_entries(entries: BTreeMap<String, String>, policy: QuotaPolicy) -> Self {
        let used_bytes = entries
            .iter()
            .map(|(k, v)| QuotaPolicy::entry_size(k, v))
            .sum();
        Self {
            entries,
            used_bytes,
            policy,
        }
    }

    pub(crate) fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    /// Insert a value, returning the previous one.
    pub(crate) fn set(&mut self, key: &str, value: &str) -> Result<Option<String>> {
        if key.is_empty() {
            return Err(KvStoreError::InvalidKey {
                reason: "Key cannot be empty".to_string(),
            });
        }

        let replaced = self
            .entries
            .get(key)
            .map(|old| QuotaPolicy::entry_size(key, old))
            .unwrap_or(0);
        let incoming = QuotaPolicy::entry_size(key, value);

        let Some(after) = self.policy.admit(self.used_bytes, replaced, incoming) else {
            return Err(KvStoreError::QuotaExceeded {
                key: key.to_string(),
                required: self.used_bytes.saturating_sub(replaced) + incoming,
                limit: self.policy.max_bytes,
            });
        };

        self.used_bytes = after;
        Ok(self.entries.insert(key.to_string(), value.to_string()))
    }

    /// Remove a value, returning it if present.
    pub(crate) fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.entries.remove(key);
        if let Some(old) = &removed {
            self.used_bytes = self
                .used_bytes
                .saturating_sub(QuotaPolicy::entry_size(key, old));
        }
        removed
    }

    /// Put back a previous state for `key` after a failed flush.
    pub(crate) fn restore(&mut self, key: &str, previous: Option<String>) {
        self.remove(key);
        if let Some(value) = previous {
            self.used_bytes += QuotaPolicy::entry_size(key, &value);
            self.entries.insert(key.to_string(), value);
        }
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn stats(&self) -> StoreStats {
        StoreStats {
            total_keys: self.entries.len(),
            used_bytes: self.used_bytes,
            max_bytes: self.policy.enabled.then_some(self.policy.max_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_tracks_overwrites_and_removals() {
        let mut map = BoundedMap::new(QuotaPolicy::new().max_bytes(64));
        map.set("a", "1234").unwrap();
        assert_eq!(map.stats().used_bytes, 5);

        map.set("a", "12").unwrap();
        assert_eq!(map.stats().used_bytes, 3);

        map.remove("a");
        assert_eq!(map.stats().used_bytes, 0);
        assert_eq!(map.stats().total_keys, 0);
    }

    #[test]
    fn test_quota_rejection_keeps_previous_value() {
        let mut map = BoundedMap::new(QuotaPolicy::new().max_bytes(10));
        map.set("k", "small").unwrap();

        let err = map.set("k", "much too large").unwrap_err();
        assert!(matches!(err, KvStoreError::QuotaExceeded { .. }));
        assert_eq!(map.get("k").as_deref(), Some("small"));
        assert_eq!(map.stats().used_bytes, 6);
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut map = BoundedMap::default();
        assert!(matches!(
            map.set("", "v"),
            Err(KvStoreError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_restore_reverts_write() {
        let mut map = BoundedMap::new(QuotaPolicy::unlimited());
        map.set("k", "old").unwrap();
        let previous = map.set("k", "new").unwrap();
        map.restore("k", previous);
        assert_eq!(map.get("k").as_deref(), Some("old"));
        assert_eq!(map.stats().used_bytes, 4);

        let previous = map.set("fresh", "v").unwrap();
        map.restore("fresh", previous);
        assert!(map.get("fresh").is_none());
    }
}
