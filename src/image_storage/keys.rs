//! Key namespace shared by the image and settings storage layers.

/// Serialized [`SiteSettings`](crate::models::SiteSettings) record
pub const SETTINGS_KEY: &str = "siteSettings";
/// Current site logo (data URI or path)
pub const SITE_LOGO_KEY: &str = "site_logo";
/// Timestamp of the current logo snapshot
pub const SITE_LOGO_TIMESTAMP_KEY: &str = "site_logo_timestamp";
/// Current favicon data URI
pub const SITE_FAVICON_KEY: &str = "site_favicon";

/// Prefix for job gallery image lists
pub const JOB_IMAGES_PREFIX: &str = "job_images";
/// Prefix for a job's featured image
pub const JOB_FEATURED_IMAGE_PREFIX: &str = "job_featured_image";

pub const SITE_LOGO_VERSION_PREFIX: &str = "site_logo_";
const DRAFT_MARKER: &str = "_latest";

/// `<key>_timestamp`: records which snapshot of `key` is current.
pub fn timestamp_key(key: &str) -> String {
    format!("{key}_timestamp")
}

/// `<resolved_key>_<timestamp>`: immutable snapshot.
pub fn snapshot_key(resolved_key: &str, timestamp: &str) -> String {
    format!("{resolved_key}_{timestamp}")
}

/// Logos and favicons get timestamped snapshots on every write.
pub fn is_versioned(key: &str) -> bool {
    key.contains("logo") || key.contains("favicon")
}

/// Any key holding job images, committed or draft.
pub fn is_job_image_key(key: &str) -> bool {
    key.contains("job_featured_image_") || key.contains("job_images_")
}

/// Draft keys belong to an entity still being edited and are never purged.
pub fn is_draft_key(key: &str) -> bool {
    key.contains(DRAFT_MARKER)
}

/// Job image list of an entity that already has an id.
pub fn is_committed_job_image_key(key: &str) -> bool {
    is_job_image_key(key) && !is_draft_key(key)
}

/// A `site_logo_*` snapshot that is no longer the current version.
///
/// Only applies while a current timestamp is recorded. The plain draft key
/// (`site_logo_latest`) is kept; its stale snapshots are not.
pub fn is_stale_logo_version(key: &str, current_timestamp: Option<&str>) -> bool {
    let Some(current) = current_timestamp else {
        return false;
    };
    if !key.starts_with(SITE_LOGO_VERSION_PREFIX) || key == SITE_LOGO_TIMESTAMP_KEY {
        return false;
    }
    if key.ends_with(DRAFT_MARKER) {
        return false;
    }
    !key.ends_with(&format!("_{current}"))
}

/// `site_logo_<digits>`: a settings logo snapshot, current or not.
pub fn is_site_logo_snapshot(key: &str) -> bool {
    key.strip_prefix(SITE_LOGO_VERSION_PREFIX)
        .is_some_and(|ts| !ts.is_empty() && ts.bytes().all(|b| b.is_ascii_digit()))
}
