use std::fmt;

/// Suffix used for an entity that has no permanent identifier yet.
pub const DRAFT_SUFFIX: &str = "latest";

/// Which copy of a job-scoped image a key refers to.
///
/// Only one draft exists per key namespace; it is promoted to a committed slot
/// once the owning job receives its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    /// Entity still being drafted, stored under `<prefix>_latest`
    Draft,
    /// Entity with a permanent id, stored under `<prefix>_<id>`
    Committed(String),
}

impl ImageSlot {
    /// Committed slot for a non-empty id, draft otherwise.
    pub fn from_job_id(job_id: Option<&str>) -> Self {
        match job_id {
            Some(id) if !id.is_empty() => Self::Committed(id.to_string()),
            _ => Self::Draft,
        }
    }

    /// Storage key for this slot under `prefix`.
    pub fn key_for(&self, prefix: &str) -> String {
        format!("{prefix}_{self}")
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => f.write_str(DRAFT_SUFFIX),
            Self::Committed(id) => f.write_str(id),
        }
    }
}

impl From<Option<&str>> for ImageSlot {
    fn from(job_id: Option<&str>) -> Self {
        Self::from_job_id(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_keys() {
        assert_eq!(ImageSlot::Draft.key_for("job_images"), "job_images_latest");
        assert_eq!(
            ImageSlot::Committed("42".to_string()).key_for("job_images"),
            "job_images_42"
        );
    }

    #[test]
    fn empty_job_id_is_a_draft() {
        assert!(ImageSlot::from_job_id(None).is_draft());
        assert!(ImageSlot::from_job_id(Some("")).is_draft());
        assert!(!ImageSlot::from(Some("7")).is_draft());
    }
}
