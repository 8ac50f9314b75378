use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use std::collections::HashMap;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

const DEFAULT_LOCALE: &str = "en";

const EN_TRANSLATIONS: &str = r#"
# Knowledge base gateway - English translations

root-banner = Knowledge base gateway is running

error-missing-file = No file received
error-list-unavailable = Unable to list files
error-transport = Could not reach the AI platform
error-invalid-response = The AI platform returned an unexpected response
"#;

const FR_TRANSLATIONS: &str = r#"
# Passerelle base de connaissances - traductions françaises

root-banner = La passerelle de la base de connaissances est démarrée

error-missing-file = Aucun fichier reçu
error-list-unavailable = Impossible de lister les fichiers
error-transport = Connexion à la plateforme IA impossible
error-invalid-response = Réponse inattendue de la plateforme IA
"#;

/// Internationalization service using Fluent.
///
/// Bundles are loaded once at construction and never mutated afterwards, so
/// the service can be shared across request handlers without locking.
pub struct I18n {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    default_locale: String,
}

impl I18n {
    /// Create a new i18n service with the embedded translations
    pub fn new() -> Self {
        let mut i18n = Self {
            bundles: HashMap::new(),
            default_locale: DEFAULT_LOCALE.to_string(),
        };

        for (locale, content) in [("en", EN_TRANSLATIONS), ("fr", FR_TRANSLATIONS)] {
            if let Err(e) = i18n.add_locale(locale, content) {
                warn!(locale = %locale, error = %e, "Failed to load embedded translations");
            }
        }

        i18n
    }

    /// Add a locale with translations
    pub fn add_locale(&mut self, locale: &str, content: &str) -> Result<(), String> {
        let lang_id: LanguageIdentifier = locale
            .parse()
            .map_err(|e| format!("Invalid locale '{}': {}", locale, e))?;

        let resource = FluentResource::try_new(content.to_string())
            .map_err(|(_, errors)| format!("Failed to parse Fluent resource: {:?}", errors))?;

        let mut bundle = FluentBundle::new_concurrent(vec![lang_id]);
        bundle
            .add_resource(resource)
            .map_err(|errors| format!("Failed to add resource to bundle: {:?}", errors))?;

        self.bundles.insert(locale.to_string(), bundle);

        debug!(locale = %locale, "Loaded translations");

        Ok(())
    }

    /// Whether translations exist for the locale
    pub fn has_locale(&self, locale: &str) -> bool {
        self.bundles.contains_key(locale)
    }

    /// Get a translated message
    pub fn get(&self, locale: &str, key: &str, args: Option<&FluentArgs>) -> String {
        // Try requested locale, fall back to default, fall back to key
        self.try_get(locale, key, args)
            .or_else(|| self.try_get(&self.default_locale, key, args))
            .unwrap_or_else(|| key.to_string())
    }

    fn try_get(&self, locale: &str, key: &str, args: Option<&FluentArgs>) -> Option<String> {
        let bundle = self.bundles.get(locale)?;
        let message = bundle.get_message(key)?;
        let pattern = message.value()?;

        let mut errors = vec![];
        let result = bundle.format_pattern(pattern, args, &mut errors);

        if !errors.is_empty() {
            warn!(key = %key, errors = ?errors, "Fluent formatting errors");
        }

        Some(result.to_string())
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}
