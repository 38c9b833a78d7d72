use std::error::Error;
use std::path::Path;

use site_branding_store::config::BrandingConfig;
use site_branding_store::image_storage::ImageStorage;
use site_branding_store::logo::LogoDisplay;
use site_branding_store::models::{STORED_SEPARATELY, SiteSettings, SiteSettingsPatch};
use site_branding_store::settings_storage::{LogoPersistence, SettingsStorage};
use site_branding_store::store::{FileStore, KeyValueStore};
use tempfile::TempDir;

const LOGO: &str = "data:image/png;base64,iVBORw0KGgo=";

fn open(path: &Path) -> Result<SettingsStorage<FileStore>, Box<dyn Error>> {
    let store = FileStore::builder().path(path).build()?;
    Ok(SettingsStorage::load(
        ImageStorage::new(store),
        BrandingConfig::default(),
    ))
}

#[test]
fn logo_round_trips_through_reopened_store() -> Result<(), Box<dyn Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");

    let mut settings = open(&path)?;
    let report = settings.update_settings(
        SiteSettingsPatch::default()
            .site_name("Acme")
            .logo(LOGO)
            .dark_mode(true),
    )?;
    assert_eq!(report.logo, Some(LogoPersistence::Stored));
    drop(settings);

    let reopened = open(&path)?;
    let store = reopened.images().store();

    let record: SiteSettings = serde_json::from_str(&store.get("siteSettings")?.unwrap())?;
    assert_eq!(record.site_name, "Acme");
    assert_eq!(record.logo, STORED_SEPARATELY);
    assert!(!record.dark_mode);
    assert_eq!(store.get("site_logo")?.as_deref(), Some(LOGO));

    assert_eq!(reopened.settings().site_name, "Acme");
    assert_eq!(reopened.settings().logo, LOGO);
    assert!(!reopened.settings().dark_mode);

    let display = LogoDisplay::new(reopened.resolver(), store, reopened.settings());
    assert_eq!(display.source(), LOGO);
    assert_eq!(display.view().initials.as_deref(), Some("AC"));
    Ok(())
}

#[test]
fn unknown_fields_survive_updates() -> Result<(), Box<dyn Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");

    let mut settings = open(&path)?;
    settings.update_settings(
        SiteSettingsPatch::default().field("contactEmail", "jobs@example.org".into()),
    )?;
    settings.update_settings(SiteSettingsPatch::default().site_name("Acme"))?;
    drop(settings);

    let reopened = open(&path)?;
    assert_eq!(
        reopened.settings().extra.get("contactEmail"),
        Some(&serde_json::Value::from("jobs@example.org"))
    );
    Ok(())
}

#[test]
fn reset_removes_every_logo_key() -> Result<(), Box<dyn Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");

    let mut settings = open(&path)?;
    settings.update_settings(
        SiteSettingsPatch::default()
            .logo(LOGO)
            .favicon("data:image/x-icon;base64,AAAB"),
    )?;
    settings
        .images()
        .store()
        .set("site_logo_latest_123", "data:image/png;base64,OLD")?;

    settings.reset_settings()?;

    let store = settings.images().store();
    let leftover: Vec<String> = store
        .keys()?
        .into_iter()
        .filter(|k| k.starts_with("site_logo") || k == "site_favicon")
        .collect();
    assert!(leftover.is_empty(), "left behind: {leftover:?}");
    assert_eq!(*settings.settings(), SiteSettings::default());

    drop(settings);
    let reopened = open(&path)?;
    assert_eq!(*reopened.settings(), SiteSettings::default());
    Ok(())
}

#[test]
fn sentinel_without_stored_logo_uses_default() -> Result<(), Box<dyn Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");
    std::fs::write(
        &path,
        r#"{"siteSettings":"{\"siteName\":\"Acme\",\"logo\":\"stored_separately\",\"favicon\":\"/favicon.ico\"}"}"#,
    )?;

    let settings = open(&path)?;
    assert_eq!(settings.settings().site_name, "Acme");
    assert_eq!(
        settings.settings().logo,
        BrandingConfig::default().default_logo_path
    );
    Ok(())
}
