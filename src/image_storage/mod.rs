//! Image persistence: job image lists, versioned logo/favicon snapshots, and purge.

pub mod compression;
pub mod keys;
pub mod service;

pub use compression::{FnCompressor, ImageCompressor, PassthroughCompressor};
pub use service::{ImageStorage, MAX_STORED_IMAGES};
