//! # Bounded KV Store
//!
//! A synchronous, string-keyed store with a byte quota, modelled on browser
//! local storage: writes either succeed completely or fail with
//! [`KvStoreError::QuotaExceeded`] and leave the previous value in place.
//!
//! ## Features
//!
//! - **Quota Enforcement**: configurable byte ceiling via [`QuotaPolicy`]
//! - **In-Memory Store**: [`MemoryStore`] for tests and ephemeral sessions
//! - **File Store**: [`FileStore`] persists a JSON object and flushes on every mutation
//! - **Shared Access**: `&self` methods with interior locking; `Arc<S>` is itself a store
//!
//! ## Basic Usage
//!
//! ```rust
//! use bounded_kv_store::{KeyValueStore, MemoryStore, QuotaPolicy};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::with_quota(QuotaPolicy::new().max_bytes(1024));
//! store.set("siteSettings", r#"{"siteName":"Acme"}"#)?;
//! assert!(store.get("siteSettings")?.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## File Store
//!
//! ```rust,no_run
//! use bounded_kv_store::{FileStore, KeyValueStore, QuotaPolicy};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileStore::builder()
//!     .path("./data/branding.json")
//!     .quota(QuotaPolicy::new().max_bytes(5 * 1024 * 1024))
//!     .build()?;
//! store.set("site_favicon", "data:image/x-icon;base64,AAAB")?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod file;
pub mod memory;
pub mod policy;
pub mod store;

pub use error::{KvStoreError, Result};
pub use file::{FileStore, FileStoreBuilder};
pub use memory::MemoryStore;
pub use policy::{DEFAULT_MAX_BYTES, QuotaPolicy};
pub use store::{KeyValueStore, StoreStats};
