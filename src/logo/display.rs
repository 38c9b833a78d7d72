use bounded_kv_store::KeyValueStore;

use super::resolver::LogoResolver;
use crate::models::SiteSettings;

/// Initials shown when no site name is set
pub const FALLBACK_INITIALS: &str = "SJ";

/// What a logo slot should render right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoView {
    /// Image source to render, if any
    pub image: Option<String>,
    /// Initials badge to render while the image is loading or after it failed
    pub initials: Option<String>,
    /// Accessible label / visible site name
    pub label: String,
}

/// Logo display state: resolved source plus load/error tracking.
#[derive(Debug, Clone)]
pub struct LogoDisplay {
    logo_field: String,
    source: String,
    site_name: String,
    loaded: bool,
    errored: bool,
}

impl LogoDisplay {
    pub fn new<S: KeyValueStore + ?Sized>(
        resolver: &LogoResolver,
        store: &S,
        settings: &SiteSettings,
    ) -> Self {
        Self {
            logo_field: settings.logo.clone(),
            source: resolver.resolve(store, &settings.logo),
            site_name: settings.site_name.clone(),
            loaded: false,
            errored: false,
        }
    }

    /// Pick up new settings. The logo is only re-resolved when the field changed,
    /// which also resets load state.
    pub fn refresh<S: KeyValueStore + ?Sized>(
        &mut self,
        resolver: &LogoResolver,
        store: &S,
        settings: &SiteSettings,
    ) {
        self.site_name = settings.site_name.clone();
        if settings.logo != self.logo_field {
            self.logo_field = settings.logo.clone();
            self.source = resolver.resolve(store, &settings.logo);
            self.loaded = false;
            self.errored = false;
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub fn mark_error(&mut self) {
        tracing::warn!(
            "Logo failed to load: {}",
            self.source.chars().take(30).collect::<String>()
        );
        self.errored = true;
    }

    pub fn view(&self) -> LogoView {
        let image = (!self.errored && !self.source.is_empty()).then(|| self.source.clone());
        let initials = (!self.loaded || self.errored).then(|| initials(&self.site_name));
        LogoView {
            image,
            initials,
            label: if self.site_name.is_empty() {
                "Logo".to_string()
            } else {
                self.site_name.clone()
            },
        }
    }
}

/// First two characters of the site name, uppercased.
///
/// Leading whitespace counts as a character; a blank name gets [`FALLBACK_INITIALS`].
pub fn initials(site_name: &str) -> String {
    if site_name.trim().is_empty() {
        return FALLBACK_INITIALS.to_string();
    }
    site_name.chars().take(2).collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::STORED_SEPARATELY;
    use bounded_kv_store::MemoryStore;

    fn settings(logo: &str, name: &str) -> SiteSettings {
        SiteSettings {
            site_name: name.to_string(),
            logo: logo.to_string(),
            ..SiteSettings::default()
        }
    }

    #[test]
    fn initials_from_site_name() {
        assert_eq!(initials("acme corp"), "AC");
        assert_eq!(initials("x"), "X");
        assert_eq!(initials("  "), FALLBACK_INITIALS);
        assert_eq!(initials("élan"), "ÉL");
        assert_eq!(initials(" acme"), " A");
    }

    #[test]
    fn shows_initials_until_loaded() {
        let resolver = LogoResolver::new("/default.png");
        let store = MemoryStore::new();
        let mut display = LogoDisplay::new(&resolver, &store, &settings("/brand.png", "Acme"));

        let view = display.view();
        assert_eq!(view.image.as_deref(), Some("/brand.png"));
        assert_eq!(view.initials.as_deref(), Some("AC"));

        display.mark_loaded();
        let view = display.view();
        assert_eq!(view.image.as_deref(), Some("/brand.png"));
        assert_eq!(view.initials, None);
    }

    #[test]
    fn error_hides_image() {
        let resolver = LogoResolver::new("/default.png");
        let store = MemoryStore::new();
        let mut display = LogoDisplay::new(&resolver, &store, &settings("/brand.png", "Acme"));
        display.mark_loaded();
        display.mark_error();

        let view = display.view();
        assert_eq!(view.image, None);
        assert_eq!(view.initials.as_deref(), Some("AC"));
    }

    #[test]
    fn refresh_re_resolves_only_on_logo_change() {
        let resolver = LogoResolver::new("/default.png");
        let store = MemoryStore::new();
        store.set("site_logo", "data:image/png;base64,S").unwrap();

        let mut display = LogoDisplay::new(&resolver, &store, &settings("/brand.png", "Acme"));
        display.mark_error();

        display.refresh(&resolver, &store, &settings("/brand.png", "Acme Two"));
        assert_eq!(display.view().image, None, "same logo keeps error state");
        assert_eq!(display.view().label, "Acme Two");

        display.refresh(&resolver, &store, &settings(STORED_SEPARATELY, "Acme Two"));
        assert_eq!(display.source(), "data:image/png;base64,S");
        assert_eq!(
            display.view().image.as_deref(),
            Some("data:image/png;base64,S")
        );
    }
}
