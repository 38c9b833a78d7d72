use bounded_kv_store::KeyValueStore;
use tracing::{debug, warn};

use crate::errors::StorageResult;
use crate::image_storage::keys::{self, SITE_LOGO_KEY, SITE_LOGO_TIMESTAMP_KEY};
use crate::models::STORED_SEPARATELY;
use crate::utils::data_uri;

/// Turns the `logo` settings field into something displayable.
///
/// Used both when settings are loaded and when the logo is rendered, so the two
/// can never disagree about which stored logo is current.
#[derive(Debug, Clone)]
pub struct LogoResolver {
    default_logo: String,
}

impl LogoResolver {
    pub fn new<S: Into<String>>(default_logo: S) -> Self {
        Self {
            default_logo: default_logo.into(),
        }
    }

    pub fn default_logo(&self) -> &str {
        &self.default_logo
    }

    /// Resolve a settings `logo` value.
    ///
    /// The sentinel is replaced by the stored logo, an empty value by the default,
    /// anything else is returned as is.
    pub fn resolve<S: KeyValueStore + ?Sized>(&self, store: &S, logo: &str) -> String {
        if logo == STORED_SEPARATELY {
            self.resolve_stored(store)
        } else if logo.is_empty() {
            self.default_logo.clone()
        } else {
            logo.to_string()
        }
    }

    /// The stored logo: current snapshot, else the plain key, else the default.
    ///
    /// Anything that is not an image data URI is replaced by the default.
    pub fn resolve_stored<S: KeyValueStore + ?Sized>(&self, store: &S) -> String {
        match read_stored_logo(store) {
            Ok(Some(logo)) if data_uri::is_image_data_uri(&logo) => {
                debug!("Resolved stored logo ({} chars)", logo.len());
                logo
            }
            Ok(Some(_)) => {
                warn!("Stored logo is not an image data URI, using default");
                self.default_logo.clone()
            }
            Ok(None) => {
                debug!("No stored logo, using default");
                self.default_logo.clone()
            }
            Err(e) => {
                warn!("Failed to read stored logo: {}", e);
                self.default_logo.clone()
            }
        }
    }
}

fn read_stored_logo<S: KeyValueStore + ?Sized>(store: &S) -> StorageResult<Option<String>> {
    if let Some(timestamp) = store.get(SITE_LOGO_TIMESTAMP_KEY)? {
        if let Some(snapshot) = store.get(&keys::snapshot_key(SITE_LOGO_KEY, &timestamp))? {
            return Ok(Some(snapshot));
        }
    }
    Ok(store.get(SITE_LOGO_KEY)?)
}
