/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Store defaults
pub const DEFAULT_STORE_PATH: &str = "./data/site-branding.json";
pub const DEFAULT_STORE_MAX_BYTES: usize = 5 * 1024 * 1024; // 5MB, typical local storage allowance
pub const DEFAULT_QUOTA_ENABLED: bool = true;

// Image defaults
pub const DEFAULT_COMPRESSION_TIMEOUT: &str = "30s";

// Branding defaults
pub const DEFAULT_SITE_NAME: &str = "Shalom Job Center";
pub const DEFAULT_LOGO_PATH: &str = "/uploads/default-logo.png";
pub const DEFAULT_FAVICON_PATH: &str = "/favicon.ico";

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";
