pub mod data_uri;
pub mod time;

pub use time::VersionClock;
