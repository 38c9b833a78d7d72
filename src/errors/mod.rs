//! Centralized error handling for the site branding store
//!
//! Every layer reports failures as typed values so callers decide whether to
//! surface a warning or quietly degrade.
//!
//! # Error Categories
//!
//! - **Storage Errors**: key-value store writes/reads, malformed stored JSON,
//!   image compression failures
//! - **Application Errors**: configuration and I/O at the CLI boundary
//!
//! # Usage
//!
//! ```rust
//! use site_branding_store::errors::{StorageError, StorageResult};
//!
//! fn example_function() -> StorageResult<String> {
//!     Err(StorageError::MalformedEntry {
//!         key: "job_images_latest".to_string(),
//!         message: "expected a JSON array".to_string(),
//!     })
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for storage layer Results
pub type StorageResult<T> = Result<T, StorageError>;
