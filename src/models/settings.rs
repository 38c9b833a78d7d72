use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::BrandingConfig;

/// Marker stored in place of a large payload that lives under its own key.
pub const STORED_SEPARATELY: &str = "stored_separately";

/// JSON names of the typed fields; these never live in `extra`.
const NAMED_FIELDS: [&str; 4] = ["siteName", "logo", "favicon", "darkMode"];

/// Site-wide settings persisted under the `siteSettings` key.
///
/// `logo` and `favicon` hold a data URI, a path/URL, or [`STORED_SEPARATELY`].
/// Fields this crate does not know about are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub favicon: String,
    /// Always false; dark mode is not offered
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SiteSettings {
    /// Defaults built from the configured fallback branding.
    pub fn defaults(branding: &BrandingConfig) -> Self {
        Self {
            site_name: branding.default_site_name.clone(),
            logo: branding.default_logo_path.clone(),
            favicon: branding.default_favicon_path.clone(),
            dark_mode: false,
            extra: Map::new(),
        }
    }

    /// Apply a partial update. Dark mode is forced off afterwards.
    pub fn merge(&mut self, patch: SiteSettingsPatch) {
        if let Some(site_name) = patch.site_name {
            self.site_name = site_name;
        }
        if let Some(logo) = patch.logo {
            self.logo = logo;
        }
        if let Some(favicon) = patch.favicon {
            self.favicon = favicon;
        }
        for (key, value) in patch.extra {
            if NAMED_FIELDS.contains(&key.as_str()) {
                debug!("Ignoring untyped value for {}", key);
                continue;
            }
            self.extra.insert(key, value);
        }
        self.dark_mode = false;
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self::defaults(&BrandingConfig::default())
    }
}

/// Partial settings update; absent fields keep their current value.
///
/// `dark_mode` is accepted so callers can pass a full form through, but it is
/// never applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SiteSettingsPatch {
    pub fn site_name<S: Into<String>>(mut self, site_name: S) -> Self {
        self.site_name = Some(site_name.into());
        self
    }

    pub fn logo<S: Into<String>>(mut self, logo: S) -> Self {
        self.logo = Some(logo.into());
        self
    }

    pub fn favicon<S: Into<String>>(mut self, favicon: S) -> Self {
        self.favicon = Some(favicon.into());
        self
    }

    pub fn dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = Some(dark_mode);
        self
    }

    /// Set a field by its JSON name. Named fields are routed to their typed slot;
    /// a value of the wrong type for one is ignored.
    pub fn field<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        let key = key.into();
        match key.as_str() {
            "siteName" => self.site_name = value.as_str().map(String::from).or(self.site_name),
            "logo" => self.logo = value.as_str().map(String::from).or(self.logo),
            "favicon" => self.favicon = value.as_str().map(String::from).or(self.favicon),
            "darkMode" => self.dark_mode = value.as_bool().or(self.dark_mode),
            _ => {
                self.extra.insert(key, value);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_camel_case_keys() {
        let settings = SiteSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("siteName"), "got: {json}");
        assert!(json.contains("darkMode"), "got: {json}");
        assert!(!json.contains("site_name"), "got: {json}");
    }

    #[test]
    fn unknown_fields_survive_roundtrip() {
        let json = r##"{"siteName":"Acme","logo":"/a.png","favicon":"","darkMode":false,"primaryColor":"#ffcc00","footer":{"year":2024}}"##;
        let settings: SiteSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.extra["primaryColor"], "#ffcc00");

        let back: Value = serde_json::to_value(&settings).unwrap();
        assert_eq!(back["footer"]["year"], 2024);
    }

    #[test]
    fn missing_fields_use_empty_values() {
        let settings: SiteSettings = serde_json::from_str(r#"{"siteName":"Acme"}"#).unwrap();
        assert_eq!(settings.logo, "");
        assert!(!settings.dark_mode);
    }

    #[test]
    fn merge_applies_present_fields_and_forces_dark_mode_off() {
        let mut settings = SiteSettings::default();
        settings.merge(
            SiteSettingsPatch::default()
                .site_name("Acme")
                .dark_mode(true)
                .field("contactEmail", Value::from("hello@acme.test")),
        );
        assert_eq!(settings.site_name, "Acme");
        assert_eq!(settings.logo, crate::config::defaults::DEFAULT_LOGO_PATH);
        assert!(!settings.dark_mode);
        assert_eq!(settings.extra["contactEmail"], "hello@acme.test");
    }

    #[test]
    fn field_routes_named_keys_to_typed_slots() {
        let patch = SiteSettingsPatch::default()
            .field("siteName", Value::from("Acme"))
            .field("darkMode", Value::from(true))
            .field("logo", Value::from(42));

        assert_eq!(patch.site_name.as_deref(), Some("Acme"));
        assert_eq!(patch.dark_mode, Some(true));
        assert_eq!(patch.logo, None);
        assert!(patch.extra.is_empty());
    }

    #[test]
    fn merge_ignores_named_keys_in_extra() {
        let mut patch = SiteSettingsPatch::default();
        patch.extra.insert("darkMode".to_string(), Value::from(true));
        patch.extra.insert("logo".to_string(), Value::from("/x.png"));

        let mut settings = SiteSettings::default();
        settings.merge(patch);

        assert!(settings.extra.is_empty());
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json.matches("\"darkMode\"").count(), 1, "got: {json}");
        let back: SiteSettings = serde_json::from_str(&json).unwrap();
        assert!(!back.dark_mode);
    }
}
