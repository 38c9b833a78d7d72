//! Image storage over a bounded key-value store

use bounded_kv_store::KeyValueStore;
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::compression::{ImageCompressor, LIST_QUALITY, SINGLE_QUALITY};
use super::keys::{
    self, JOB_FEATURED_IMAGE_PREFIX, JOB_IMAGES_PREFIX, SITE_LOGO_TIMESTAMP_KEY,
};
use crate::errors::{StorageError, StorageResult};
use crate::models::ImageSlot;
use crate::utils::{VersionClock, data_uri};

/// Hard cap on images kept per job list
pub const MAX_STORED_IMAGES: usize = 3;

const DEFAULT_COMPRESSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Stores, versions and reclaims image data URIs.
///
/// Job images are namespaced by [`ImageSlot`]; logo and favicon writes also leave
/// a timestamped snapshot so readers can bypass stale caches.
#[derive(Debug)]
pub struct ImageStorage<S> {
    store: S,
    clock: VersionClock,
    compression_timeout: Duration,
}

impl<S: KeyValueStore> ImageStorage<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: VersionClock::new(),
            compression_timeout: DEFAULT_COMPRESSION_TIMEOUT,
        }
    }

    /// Bound each compressor call; a timed-out image counts as failed.
    pub fn with_compression_timeout(mut self, timeout: Duration) -> Self {
        self.compression_timeout = timeout;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn next_timestamp(&self) -> i64 {
        self.clock.next()
    }

    /// Remove committed job images and superseded logo snapshots.
    ///
    /// Draft (`_latest`) entries and the current logo snapshot are kept. Keys that
    /// fail to delete are logged and skipped. Returns the number removed.
    pub fn purge_old_image_entries(&self) -> StorageResult<usize> {
        let current = self.store.get(SITE_LOGO_TIMESTAMP_KEY)?;
        self.purge_where(|key| {
            keys::is_committed_job_image_key(key)
                || keys::is_stale_logo_version(key, current.as_deref())
        })
    }

    /// Remove only superseded logo snapshots.
    pub fn purge_stale_logo_versions(&self) -> StorageResult<usize> {
        let current = self.store.get(SITE_LOGO_TIMESTAMP_KEY)?;
        self.purge_where(|key| keys::is_stale_logo_version(key, current.as_deref()))
    }

    fn purge_where<P: Fn(&str) -> bool>(&self, predicate: P) -> StorageResult<usize> {
        let to_remove: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|key| predicate(key))
            .collect();

        let mut removed = 0;
        for key in &to_remove {
            match self.store.remove(key) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to purge {}: {}", key, e),
            }
        }

        if removed > 0 {
            info!("Purged {} old image entries", removed);
        }
        Ok(removed)
    }

    fn purge_before_write(&self) {
        if let Err(e) = self.purge_old_image_entries() {
            warn!("Purge before image write failed: {}", e);
        }
    }

    async fn compress<C>(&self, image: &str, quality: f32, compressor: &C) -> StorageResult<String>
    where
        C: ImageCompressor + ?Sized,
    {
        let compressed =
            tokio::time::timeout(self.compression_timeout, compressor.compress(image, quality))
                .await
                .map_err(|_| StorageError::CompressionTimeout {
                    timeout: self.compression_timeout,
                })??;

        if compressed.is_empty() {
            return Err(StorageError::Compression {
                message: "compressor returned an empty image".to_string(),
            });
        }
        Ok(compressed)
    }

    /// Compress and store up to [`MAX_STORED_IMAGES`] images under `key` for `slot`.
    ///
    /// Images are compressed concurrently; the result keeps input order and drops
    /// images whose compression failed. Nothing is written when every image failed.
    /// Returns the images actually stored, each tagged with `#t=<timestamp>`.
    pub async fn store_images<C>(
        &self,
        key: &str,
        images: &[String],
        compressor: &C,
        slot: &ImageSlot,
    ) -> StorageResult<Vec<String>>
    where
        C: ImageCompressor + ?Sized,
    {
        self.purge_before_write();

        let storage_key = slot.key_for(key);
        if images.len() > MAX_STORED_IMAGES {
            debug!(
                "Keeping first {} of {} images for {}",
                MAX_STORED_IMAGES,
                images.len(),
                storage_key
            );
        }

        let key_ref = storage_key.as_str();
        let processed = join_all(images.iter().take(MAX_STORED_IMAGES).enumerate().map(
            |(index, image)| async move {
                match self.compress(image, LIST_QUALITY, compressor).await {
                    Ok(compressed) => Some(data_uri::with_cache_buster(
                        &compressed,
                        self.clock.next(),
                    )),
                    Err(e) => {
                        warn!("Dropping image {} for {}: {}", index, key_ref, e);
                        None
                    }
                }
            },
        ))
        .await;

        let stored: Vec<String> = processed.into_iter().flatten().collect();

        if !stored.is_empty() {
            self.store
                .set(&storage_key, &serde_json::to_string(&stored)?)?;
            info!("Stored {} images in {}", stored.len(), storage_key);
        }

        Ok(stored)
    }

    /// Compress and store a single image under `key` for `slot`.
    ///
    /// For logo and favicon keys a snapshot `<resolved>_<timestamp>` and the
    /// pointer `<key>_timestamp` are written before the plain key, so an
    /// interrupted write always leaves something readable.
    pub async fn store_single_image<C>(
        &self,
        key: &str,
        image: &str,
        compressor: &C,
        slot: &ImageSlot,
    ) -> StorageResult<String>
    where
        C: ImageCompressor + ?Sized,
    {
        self.purge_before_write();

        let storage_key = slot.key_for(key);
        let compressed = self.compress(image, SINGLE_QUALITY, compressor).await?;

        if keys::is_versioned(key) {
            let timestamp = self.clock.next().to_string();
            self.store
                .set(&keys::snapshot_key(&storage_key, &timestamp), &compressed)?;
            self.store.set(&keys::timestamp_key(key), &timestamp)?;
        }

        self.store.set(&storage_key, &compressed)?;
        info!("Stored image in {}", storage_key);

        Ok(compressed)
    }

    /// Read the image list stored under `key` for `slot`.
    ///
    /// Missing entries yield an empty list; so do malformed ones, with a warning.
    pub fn get_images(&self, key: &str, slot: &ImageSlot) -> StorageResult<Vec<String>> {
        let storage_key = slot.key_for(key);
        let Some(raw) = self.store.get(&storage_key)? else {
            return Ok(Vec::new());
        };

        match parse_image_list(&storage_key, &raw) {
            Ok(images) => Ok(images),
            Err(e) => {
                warn!("{}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Read a single image, preferring the snapshot named by `<key>_timestamp`.
    ///
    /// Falls back to the plain key when no snapshot is recorded or it is missing.
    /// Surrounding JSON string quotes are stripped. Empty string when nothing is stored.
    pub fn get_single_image(&self, key: &str, slot: &ImageSlot) -> StorageResult<String> {
        let storage_key = slot.key_for(key);

        let mut image = None;
        if let Some(timestamp) = self.store.get(&keys::timestamp_key(key))? {
            image = self
                .store
                .get(&keys::snapshot_key(&storage_key, &timestamp))?;
            if image.is_none() {
                debug!(
                    "Snapshot {} for {} missing, using plain key",
                    timestamp, storage_key
                );
            }
        }
        if image.is_none() {
            image = self.store.get(&storage_key)?;
        }

        Ok(image.map(|img| strip_json_quotes(&img).to_string()).unwrap_or_default())
    }

    /// Drop the draft job image entries.
    pub fn clear_temporary_images(&self) -> StorageResult<()> {
        self.store.remove(&ImageSlot::Draft.key_for(JOB_IMAGES_PREFIX))?;
        self.store
            .remove(&ImageSlot::Draft.key_for(JOB_FEATURED_IMAGE_PREFIX))?;
        info!("Temporary images cleared");
        Ok(())
    }
}

fn parse_image_list(storage_key: &str, raw: &str) -> StorageResult<Vec<String>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| StorageError::MalformedEntry {
            key: storage_key.to_string(),
            message: e.to_string(),
        })?;

    let serde_json::Value::Array(items) = value else {
        return Err(StorageError::MalformedEntry {
            key: storage_key.to_string(),
            message: "expected a JSON array".to_string(),
        });
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

fn strip_json_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
