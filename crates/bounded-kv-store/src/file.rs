//! JSON-file-backed store that flushes on every mutation.

use crate::{
    error::{KvStoreError, Result},
    policy::QuotaPolicy,
    store::{BoundedMap, KeyValueStore, StoreStats},
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

/// Store persisted as a single JSON object on disk.
///
/// Every successful `set`/`remove` is written through before returning. A failed
/// flush rolls the in-memory change back so memory and disk never disagree.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: RwLock<BoundedMap>,
}

impl FileStore {
    /// Create a new builder for configuring the store.
    #[must_use]
    pub fn builder() -> FileStoreBuilder {
        FileStoreBuilder::new()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, map: &BoundedMap) -> Result<()> {
        let contents = serde_json::to_string_pretty(map.entries())?;
        let tmp_path = self.path.with_extension("json.tmp");

        std::fs::write(&tmp_path, contents).map_err(|source| KvStoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|source| KvStoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.inner.read().map_err(|_| KvStoreError::LockPoisoned)?;
        Ok(map.get(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.inner.write().map_err(|_| KvStoreError::LockPoisoned)?;
        let previous = map.set(key, value)?;
        if let Err(e) = self.flush(&map) {
            map.restore(key, previous);
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.inner.write().map_err(|_| KvStoreError::LockPoisoned)?;
        let Some(previous) = map.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush(&map) {
            map.restore(key, Some(previous));
            return Err(e);
        }
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

/// Builder for creating a [`FileStore`].
#[derive(Debug, Default)]
pub struct FileStoreBuilder {
    path: Option<PathBuf>,
    quota: QuotaPolicy,
}

impl FileStoreBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Set the backing file path.
    #[must_use]
    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the capacity policy.
    #[must_use]
    pub fn quota(mut self, policy: QuotaPolicy) -> Self {
        self.quota = policy;
        self
    }

    /// Open the store, loading existing entries from disk.
    ///
    /// # Errors
    /// Returns an error if:
    /// - No path was configured
    /// - The parent directory cannot be created
    /// - The existing file is unreadable or not a JSON object of strings
    pub fn build(self) -> Result<FileStore> {
        let path = self.path.ok_or_else(|| KvStoreError::Configuration {
            message: "File store path is required".to_string(),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| KvStoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let entries: BTreeMap<String, String> = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|source| KvStoreError::Io {
                path: path.clone(),
                source,
            })?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };

        let map = BoundedMap::from_entries(entries, self.quota);
        let stats = map.stats();
        tracing::info!(
            "Opened key-value store {:?}: {} keys, {} bytes used",
            path,
            stats.total_keys,
            stats.used_bytes
        );

        Ok(FileStore {
            path,
            inner: RwLock::new(map),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persists_across_reopen() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("store.json");

        let store = FileStore::builder().path(&path).build()?;
        store.set("site_logo", "data:image/png;base64,AAA")?;
        store.set("site_favicon", "data:image/x-icon;base64,BBB")?;
        store.remove("site_favicon")?;
        drop(store);

        let reopened = FileStore::builder().path(&path).build()?;
        assert_eq!(
            reopened.get("site_logo")?.as_deref(),
            Some("data:image/png;base64,AAA")
        );
        assert_eq!(reopened.get("site_favicon")?, None);
        assert_eq!(reopened.stats()?.used_bytes, "site_logo".len() + 25);
        Ok(())
    }

    #[test]
    fn test_creates_parent_directories() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("nested/deeper/store.json");

        let store = FileStore::builder().path(&path).build()?;
        store.set("k", "v")?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_quota_applies_to_file_store() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let store = FileStore::builder()
            .path(temp_dir.path().join("store.json"))
            .quota(QuotaPolicy::new().max_bytes(8))
            .build()?;

        store.set("k", "1234")?;
        assert!(matches!(
            store.set("k2", "12345678"),
            Err(KvStoreError::QuotaExceeded { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_missing_path_is_configuration_error() {
        assert!(matches!(
            FileStore::builder().build(),
            Err(KvStoreError::Configuration { .. })
        ));
    }

    #[test]
    fn test_corrupt_file_is_rejected() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("store.json");
        std::fs::write(&path, "not json")?;

        assert!(matches!(
            FileStore::builder().path(&path).build(),
            Err(KvStoreError::Serialization(_))
        ));
        Ok(())
    }
}
