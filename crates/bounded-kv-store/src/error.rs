//! Error types for the bounded key-value store.

use std::path::PathBuf;

/// Result type for key-value store operations.
pub type Result<T> = std::result::Result<T, KvStoreError>;

/// Errors that can occur while reading or writing the store.
#[derive(Debug, thiserror::Error)]
pub enum KvStoreError {
    /// The write would push the store past its byte ceiling
    #[error("Quota exceeded writing {key}: {required} bytes required, {limit} bytes allowed")]
    QuotaExceeded {
        key: String,
        required: usize,
        limit: usize,
    },

    /// I/O operation on the backing file failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Backing file contents could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Keys must be non-empty
    #[error("Invalid key: {reason}")]
    InvalidKey { reason: String },

    /// Internal lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}
