//! Internationalization (i18n) of interface strings

use anyhow::Result;
use std::collections::HashMap;

/// Built-in language files: (language, YAML)
const LANGUAGES: &[(&str, &str)] = &[
    ("pt-BR", include_str!("languages/pt-BR.yml")),
    ("en", include_str!("languages/en.yml")),
];

const FALLBACK_LANGUAGE: &str = "en";

/// Interface translations for one language
#[derive(Debug, Clone)]
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, String>>,
}

impl I18n {
    /// Load the built-in languages and select `language`
    pub fn new(language: &str) -> Result<Self> {
        let mut translations = HashMap::new();
        for (lang, source) in LANGUAGES {
            let data: HashMap<String, String> = serde_yaml::from_str(source)?;
            translations.insert(lang.to_string(), data);
        }

        if !translations.contains_key(language) {
            tracing::warn!(
                "No translations for {:?}, falling back to {}",
                language,
                FALLBACK_LANGUAGE
            );
        }

        Ok(Self {
            language: language.to_string(),
            translations,
        })
    }

    /// Get the current language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get a translation by key, falling back to English and then the key itself
    pub fn get(&self, key: &str) -> String {
        [self.language.as_str(), FALLBACK_LANGUAGE]
            .iter()
            .find_map(|lang| self.translations.get(*lang)?.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
