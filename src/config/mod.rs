use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use bounded_kv_store::QuotaPolicy;

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub images: ImageConfig,
    #[serde(default)]
    pub branding: BrandingConfig,
}

/// Where the key-value store lives and how large it may grow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Byte ceiling over all keys and values
    #[serde(default = "default_store_max_bytes")]
    pub max_bytes: usize,
    #[serde(default = "default_quota_enabled")]
    pub quota_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Upper bound for a single compressor call
    #[serde(
        default = "default_compression_timeout",
        with = "duration_serde::duration"
    )]
    pub compression_timeout: Duration,
}

/// Fallback branding used when nothing valid is stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingConfig {
    #[serde(default = "default_site_name")]
    pub default_site_name: String,
    #[serde(default = "default_logo_path")]
    pub default_logo_path: String,
    #[serde(default = "default_favicon_path")]
    pub default_favicon_path: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_store_max_bytes() -> usize {
    DEFAULT_STORE_MAX_BYTES
}

fn default_quota_enabled() -> bool {
    DEFAULT_QUOTA_ENABLED
}

fn default_compression_timeout() -> Duration {
    // Constant is validated by the defaults test below
    humantime::parse_duration(DEFAULT_COMPRESSION_TIMEOUT).unwrap_or(Duration::from_secs(30))
}

fn default_site_name() -> String {
    DEFAULT_SITE_NAME.to_string()
}

fn default_logo_path() -> String {
    DEFAULT_LOGO_PATH.to_string()
}

fn default_favicon_path() -> String {
    DEFAULT_FAVICON_PATH.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            max_bytes: default_store_max_bytes(),
            quota_enabled: default_quota_enabled(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            compression_timeout: default_compression_timeout(),
        }
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            default_site_name: default_site_name(),
            default_logo_path: default_logo_path(),
            default_favicon_path: default_favicon_path(),
        }
    }
}

impl StoreConfig {
    pub fn quota_policy(&self) -> QuotaPolicy {
        QuotaPolicy::new()
            .max_bytes(self.max_bytes)
            .enabled(self.quota_enabled)
    }
}

impl Config {
    /// Load configuration from a TOML file, writing the defaults out if it does not exist.
    pub fn load_from_file(config_file: &str) -> AppResult<Self> {
        if std::path::Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            let config: Self = toml::from_str(&contents).map_err(|e| AppError::Configuration {
                message: format!("{config_file}: {e}"),
            })?;
            config.validate()?;
            Ok(config)
        } else {
            let default_config = Self::default();
            let contents =
                toml::to_string_pretty(&default_config).map_err(|e| AppError::Configuration {
                    message: e.to_string(),
                })?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    fn validate(&self) -> AppResult<()> {
        if self.store.quota_enabled && self.store.max_bytes == 0 {
            return Err(AppError::Configuration {
                message: "store.max_bytes must be greater than zero when the quota is enabled"
                    .to_string(),
            });
        }
        if self.images.compression_timeout.is_zero() {
            return Err(AppError::Configuration {
                message: "images.compression_timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
