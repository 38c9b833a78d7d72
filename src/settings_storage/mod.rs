//! Site settings persistence
//!
//! The settings record lives under `siteSettings`. Large fields are kept out of
//! it: a data-URI logo or favicon is written to its own keys and the record
//! holds [`STORED_SEPARATELY`] instead. Dark mode is always off.

use bounded_kv_store::KeyValueStore;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::BrandingConfig;
use crate::errors::StorageResult;
use crate::image_storage::ImageStorage;
use crate::image_storage::keys::{
    self, SETTINGS_KEY, SITE_FAVICON_KEY, SITE_LOGO_KEY, SITE_LOGO_TIMESTAMP_KEY,
    SITE_LOGO_VERSION_PREFIX,
};
use crate::logo::LogoResolver;
use crate::models::{STORED_SEPARATELY, SiteSettings, SiteSettingsPatch};
use crate::utils::data_uri;

/// Longest logo kept when the full one does not fit
pub const MAX_FALLBACK_LOGO_CHARS: usize = 1_000_000;

/// How a large asset ended up in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoPersistence {
    /// Stored in full
    Stored,
    /// Only the plain key was written, truncated if needed
    Truncated,
    /// Nothing could be stored
    Dropped,
}

/// Outcome of persisting settings. `None` means the field held no data URI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistReport {
    pub logo: Option<LogoPersistence>,
    pub favicon: Option<LogoPersistence>,
}

impl PersistReport {
    /// Whether any asset was not stored in full.
    pub fn degraded(&self) -> bool {
        [self.logo, self.favicon]
            .into_iter()
            .flatten()
            .any(|p| p != LogoPersistence::Stored)
    }
}

/// In-memory settings kept in sync with the store.
#[derive(Debug)]
pub struct SettingsStorage<S> {
    images: ImageStorage<S>,
    resolver: LogoResolver,
    branding: BrandingConfig,
    settings: SiteSettings,
}

impl<S: KeyValueStore> SettingsStorage<S> {
    /// Load settings from the store. Never fails: anything unreadable falls back to defaults.
    pub fn load(images: ImageStorage<S>, branding: BrandingConfig) -> Self {
        let resolver = LogoResolver::new(branding.default_logo_path.clone());
        let settings = read_settings(images.store(), &resolver, &branding);
        info!("Settings loaded for {}", settings.site_name);

        Self {
            images,
            resolver,
            branding,
            settings,
        }
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    pub fn images(&self) -> &ImageStorage<S> {
        &self.images
    }

    pub fn resolver(&self) -> &LogoResolver {
        &self.resolver
    }

    /// Merge a partial update, force dark mode off, and persist.
    ///
    /// The in-memory settings are updated even if persisting fails.
    pub fn update_settings(&mut self, patch: SiteSettingsPatch) -> StorageResult<PersistReport> {
        if patch.dark_mode == Some(true) {
            debug!("Ignoring request to enable dark mode");
        }
        self.settings.merge(patch);
        self.persist()
    }

    /// Remove stored logo/favicon data and return to defaults.
    pub fn reset_settings(&mut self) -> StorageResult<PersistReport> {
        let store = self.images.store();
        let mut to_remove: Vec<String> = store
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(SITE_LOGO_VERSION_PREFIX))
            .collect();
        to_remove.extend(
            [SITE_LOGO_KEY, SITE_LOGO_TIMESTAMP_KEY, SITE_FAVICON_KEY].map(String::from),
        );

        for key in &to_remove {
            store.remove(key)?;
        }

        self.settings = SiteSettings::defaults(&self.branding);
        info!("Settings reset to defaults");
        self.persist()
    }

    /// Write the current settings, with large assets split out.
    pub fn persist(&self) -> StorageResult<PersistReport> {
        let mut report = PersistReport::default();

        if data_uri::is_data_uri(&self.settings.logo) {
            report.logo = Some(self.persist_logo(&self.settings.logo));
        }
        if data_uri::is_data_uri(&self.settings.favicon) {
            report.favicon = Some(self.persist_favicon(&self.settings.favicon));
        }

        let record = self.record_for_storage();
        self.images
            .store()
            .set(SETTINGS_KEY, &serde_json::to_string(&record)?)?;
        debug!("Settings record saved");

        if report.degraded() {
            warn!("Settings saved with degraded assets: {:?}", report);
        }
        Ok(report)
    }

    /// Copy of the settings suitable for the `siteSettings` record.
    fn record_for_storage(&self) -> SiteSettings {
        let mut record = self.settings.clone();
        if data_uri::is_data_uri(&record.logo) {
            record.logo = STORED_SEPARATELY.to_string();
        }
        if data_uri::is_data_uri(&record.favicon) {
            record.favicon = STORED_SEPARATELY.to_string();
        }
        record.dark_mode = false;
        record
    }

    fn persist_logo(&self, logo: &str) -> LogoPersistence {
        let store = self.images.store();
        let timestamp = self.images.next_timestamp().to_string();
        let snapshot = keys::snapshot_key(SITE_LOGO_KEY, &timestamp);

        let full_write = store
            .set(&snapshot, logo)
            .and_then(|_| store.set(SITE_LOGO_KEY, logo))
            .and_then(|_| store.set(SITE_LOGO_TIMESTAMP_KEY, &timestamp));

        match full_write {
            Ok(()) => {
                debug!("Logo saved with snapshot {}", timestamp);
                if let Err(e) = self.images.purge_stale_logo_versions() {
                    warn!("Failed to purge old logo snapshots: {}", e);
                }
                LogoPersistence::Stored
            }
            Err(e) => {
                warn!("Failed to save logo snapshot: {}", e);
                self.clear_logo_versions(&snapshot);

                let truncated = data_uri::truncate_chars(logo, MAX_FALLBACK_LOGO_CHARS);
                match store.set(SITE_LOGO_KEY, truncated) {
                    Ok(()) => {
                        warn!(
                            "Logo saved without snapshot ({} of {} chars)",
                            truncated.len(),
                            logo.len()
                        );
                        LogoPersistence::Truncated
                    }
                    Err(e) => {
                        error!("Unable to save logo, even truncated: {}", e);
                        LogoPersistence::Dropped
                    }
                }
            }
        }
    }

    /// Drop the pointer and every logo snapshot, so only the plain key remains.
    fn clear_logo_versions(&self, attempted: &str) {
        let store = self.images.store();
        let mut to_remove = vec![attempted.to_string(), SITE_LOGO_TIMESTAMP_KEY.to_string()];
        match store.keys() {
            Ok(all) => to_remove.extend(
                all.into_iter()
                    .filter(|k| keys::is_site_logo_snapshot(k) && k != attempted),
            ),
            Err(e) => warn!("Failed to list logo snapshots: {}", e),
        }

        for key in &to_remove {
            if let Err(e) = store.remove(key) {
                warn!("Failed to remove {}: {}", key, e);
            }
        }
    }

    fn persist_favicon(&self, favicon: &str) -> LogoPersistence {
        match self.images.store().set(SITE_FAVICON_KEY, favicon) {
            Ok(()) => LogoPersistence::Stored,
            Err(e) => {
                error!("Unable to save favicon: {}", e);
                LogoPersistence::Dropped
            }
        }
    }
}

fn read_settings<S: KeyValueStore + ?Sized>(
    store: &S,
    resolver: &LogoResolver,
    branding: &BrandingConfig,
) -> SiteSettings {
    let mut settings = match store.get(SETTINGS_KEY) {
        Ok(Some(raw)) => match serde_json::from_str::<SiteSettings>(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Stored settings are malformed, using defaults: {}", e);
                SiteSettings::defaults(branding)
            }
        },
        Ok(None) => SiteSettings::defaults(branding),
        Err(e) => {
            error!("Failed to read settings, using defaults: {}", e);
            SiteSettings::defaults(branding)
        }
    };

    if settings.logo == STORED_SEPARATELY {
        settings.logo = resolver.resolve_stored(store);
    }

    if settings.favicon == STORED_SEPARATELY {
        match store.get(SITE_FAVICON_KEY) {
            Ok(Some(favicon)) => settings.favicon = favicon,
            Ok(None) => debug!("Favicon marked as stored separately but not found"),
            Err(e) => warn!("Failed to read favicon: {}", e),
        }
    }

    settings.dark_mode = false;
    settings
}
