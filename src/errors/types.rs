//! Error type definitions for the site branding store

use bounded_kv_store::KvStoreError;
use std::time::Duration;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Storage layer errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Key-value store errors raised outside the storage layer (e.g. opening the store)
    #[error("Store error: {0}")]
    Store(#[from] KvStoreError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Input validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage layer specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// The underlying key-value store rejected the operation (quota, I/O, lock)
    #[error("Key-value store failure: {0}")]
    Store(#[from] KvStoreError),

    /// A stored value exists but could not be interpreted
    #[error("Malformed entry: {key} - {message}")]
    MalformedEntry { key: String, message: String },

    /// Serializing a value for storage failed
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The injected compressor rejected the image
    #[error("Compression failed: {message}")]
    Compression { message: String },

    /// The injected compressor did not answer in time
    #[error("Compression timed out after {timeout:?}")]
    CompressionTimeout { timeout: Duration },
}

impl StorageError {
    /// Whether the failure was the store running out of capacity.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::Store(KvStoreError::QuotaExceeded { .. }))
    }
}

/// Failure reported by an [`ImageCompressor`](crate::image_storage::ImageCompressor).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CompressionError {
    pub message: String,
}

impl CompressionError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<CompressionError> for StorageError {
    fn from(err: CompressionError) -> Self {
        Self::Compression {
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_exceeded_is_detected_through_storage_error() {
        let err = StorageError::from(KvStoreError::QuotaExceeded {
            key: "site_logo".to_string(),
            required: 10,
            limit: 5,
        });
        assert!(err.is_quota_exceeded());
        assert!(err.to_string().contains("site_logo"));

        let other = StorageError::Compression {
            message: "bad".to_string(),
        };
        assert!(!other.is_quota_exceeded());
    }

    #[test]
    fn compression_error_converts() {
        let err: StorageError = CompressionError::new("decoder rejected input").into();
        assert_eq!(
            err.to_string(),
            "Compression failed: decoder rejected input"
        );
    }
}
