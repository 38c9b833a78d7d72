//! Site branding persistence over a bounded key-value store.
//!
//! - [`image_storage`] stores job image lists and versioned logo/favicon images
//! - [`settings_storage`] keeps the site settings record in sync with the store
//! - [`logo`] turns the settings `logo` field into something displayable

pub mod config;
pub mod errors;
pub mod image_storage;
pub mod logo;
pub mod models;
pub mod settings_storage;
pub mod utils;

pub use bounded_kv_store as store;
