use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use site_branding_store::{
    config::Config,
    image_storage::{ImageStorage, PassthroughCompressor, keys},
    logo::{LogoDisplay, initials},
    models::{ImageSlot, SiteSettingsPatch},
    settings_storage::{PersistReport, SettingsStorage},
    store::FileStore,
    utils::data_uri,
};

#[derive(Parser)]
#[command(name = "site-branding")]
#[command(version)]
#[command(about = "Manage site branding settings and images in a local key-value store")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "site-branding.toml")]
    config: String,

    /// Store file path (overrides config file)
    #[arg(short, long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved settings as JSON
    Show,
    /// Change the site name
    SetName { name: String },
    /// Store an image file as the site logo
    SetLogo { file: PathBuf },
    /// Store an image file as the favicon
    SetFavicon { file: PathBuf },
    /// Remove stored branding and return to defaults
    Reset,
    /// Store up to three images for a job
    StoreImages {
        #[arg(short, long)]
        key: String,
        /// Job id; omit to store draft images
        #[arg(short, long)]
        job_id: Option<String>,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the images stored for a job
    GetImages {
        #[arg(short, long)]
        key: String,
        #[arg(short, long)]
        job_id: Option<String>,
    },
    /// Remove committed job images and superseded logo snapshots
    Purge,
    /// Remove draft job images
    ClearTemp,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!(
        "site_branding_store={0},site_branding={0},bounded_kv_store={0}",
        cli.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(store) = cli.store {
        config.store.path = store;
    }

    let store = FileStore::builder()
        .path(config.store.path.clone())
        .quota(config.store.quota_policy())
        .build()
        .with_context(|| format!("opening store {}", config.store.path.display()))?;
    let images =
        ImageStorage::new(store).with_compression_timeout(config.images.compression_timeout);

    match cli.command {
        Command::Show => {
            let settings = SettingsStorage::load(images, config.branding);
            let display = LogoDisplay::new(
                settings.resolver(),
                settings.images().store(),
                settings.settings(),
            );
            let mut value = serde_json::to_value(settings.settings())?;
            value["logoInitials"] = initials(&settings.settings().site_name).into();
            value["logoSource"] = summarize(display.source()).into();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::SetName { name } => {
            let mut settings = SettingsStorage::load(images, config.branding);
            let report = settings.update_settings(SiteSettingsPatch::default().site_name(name))?;
            print_report(&report);
        }
        Command::SetLogo { file } => {
            let logo = read_image(&file).await?;
            let mut settings = SettingsStorage::load(images, config.branding);
            let report = settings.update_settings(SiteSettingsPatch::default().logo(logo))?;
            print_report(&report);
        }
        Command::SetFavicon { file } => {
            let favicon = read_image(&file).await?;
            let mut settings = SettingsStorage::load(images, config.branding);
            let report = settings.update_settings(SiteSettingsPatch::default().favicon(favicon))?;
            print_report(&report);
        }
        Command::Reset => {
            let mut settings = SettingsStorage::load(images, config.branding);
            let report = settings.reset_settings()?;
            print_report(&report);
        }
        Command::StoreImages { key, job_id, files } => {
            let mut encoded = Vec::with_capacity(files.len());
            for file in &files {
                encoded.push(read_image(file).await?);
            }
            let slot = ImageSlot::from_job_id(job_id.as_deref());
            let stored = images
                .store_images(&key, &encoded, &PassthroughCompressor, &slot)
                .await?;
            println!(
                "Stored {} of {} images in {}",
                stored.len(),
                files.len(),
                slot.key_for(&key)
            );
        }
        Command::GetImages { key, job_id } => {
            let slot = ImageSlot::from_job_id(job_id.as_deref());
            if key == keys::JOB_FEATURED_IMAGE_PREFIX {
                let image = images.get_single_image(&key, &slot)?;
                println!("{}", summarize(&image));
            } else {
                for image in images.get_images(&key, &slot)? {
                    println!("{}", summarize(&image));
                }
            }
        }
        Command::Purge => {
            let removed = images.purge_old_image_entries()?;
            println!("Removed {removed} entries");
        }
        Command::ClearTemp => {
            images.clear_temporary_images()?;
            println!("Temporary images cleared");
        }
    }

    Ok(())
}

async fn read_image(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let fallback = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(data_uri::mime_from_extension);
    Ok(data_uri::encode_image(&bytes, fallback)?)
}

/// Data URIs are shortened to their header and size.
fn summarize(value: &str) -> String {
    let value = data_uri::strip_cache_buster(value);
    if !data_uri::is_data_uri(value) {
        return value.to_string();
    }
    let header = value.split(',').next().unwrap_or(value);
    format!("{header},... ({} chars)", value.len())
}

fn print_report(report: &PersistReport) {
    if report.degraded() {
        warn!("Some branding assets were not stored in full");
    }
    match serde_json::to_string(report) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!("Failed to render persist report: {}", e),
    }
}
