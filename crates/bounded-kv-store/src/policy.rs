//! Capacity policies for key-value stores.

use serde::{Deserialize, Serialize};

/// Default ceiling, matching the common 5MB browser local storage allowance.
pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Byte ceiling applied to every write.
///
/// Usage is measured as the sum of `key.len() + value.len()` over all entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    /// Maximum total size of keys and values in bytes
    pub max_bytes: usize,
    /// Whether the ceiling is enforced
    pub enabled: bool,
}

impl QuotaPolicy {
    /// Create a new quota policy with the default 5MB ceiling.
    pub fn new() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            enabled: true,
        }
    }

    /// Set the byte ceiling.
    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Enable or disable enforcement.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// A policy that never rejects a write.
    pub fn unlimited() -> Self {
        Self {
            max_bytes: usize::MAX,
            enabled: false,
        }
    }

    /// Size an entry contributes to usage.
    pub fn entry_size(key: &str, value: &str) -> usize {
        key.len() + value.len()
    }

    /// Check whether a store currently using `used` bytes may replace an entry
    /// of `replaced` bytes with one of `incoming` bytes.
    ///
    /// Returns the usage after the write, or `None` when it would exceed the ceiling.
    pub fn admit(&self, used: usize, replaced: usize, incoming: usize) -> Option<usize> {
        let after = used.saturating_sub(replaced).saturating_add(incoming);
        if self.enabled && after > self.max_bytes {
            None
        } else {
            Some(after)
        }
    }
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::new()
    }
}
