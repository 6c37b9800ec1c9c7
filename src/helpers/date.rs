//! Date helper functions

use anyhow::{anyhow, Result};
use chrono::{DateTime, Locale, Utc};
use chrono_tz::Tz;

use crate::config::SiteConfig;
use crate::i18n::I18n;

/// Day, abbreviated month, year
const DATE_FORMAT: &str = "%d %b %Y";

/// Formats timestamps in a fixed zone and locale
#[derive(Debug, Clone)]
pub struct DateFormatter {
    tz: Tz,
    locale: Locale,
    /// Word joining date and time of day ("às" in pt-BR)
    at_word: String,
}

impl DateFormatter {
    pub fn new(tz: Tz, locale: Locale, at_word: &str) -> Self {
        Self {
            tz,
            locale,
            at_word: at_word.to_string(),
        }
    }

    /// Build from the site timezone and language
    pub fn from_config(config: &SiteConfig, i18n: &I18n) -> Result<Self> {
        let tz: Tz = config
            .timezone
            .parse()
            .map_err(|e| anyhow!("invalid timezone {:?}: {}", config.timezone, e))?;
        let locale = parse_locale(&config.language)?;
        Ok(Self::new(tz, locale, &i18n.get("at")))
    }

    /// Format as `25 mar 2021`
    pub fn format_date(&self, date: &DateTime<Utc>) -> String {
        date.with_timezone(&self.tz)
            .format_localized(DATE_FORMAT, self.locale)
            .to_string()
    }

    /// Format as `25 mar 2021, às 19:25`
    pub fn format_date_time(&self, date: &DateTime<Utc>) -> String {
        let format = format!("{}, {} %H:%M", DATE_FORMAT, self.at_word);
        date.with_timezone(&self.tz)
            .format_localized(&format, self.locale)
            .to_string()
    }

    /// Format an optional timestamp, empty when absent
    pub fn format_optional(&self, date: Option<&DateTime<Utc>>) -> String {
        date.map(|d| self.format_date(d)).unwrap_or_default()
    }
}

/// Map a language tag such as `pt-BR` to a chrono locale
pub fn parse_locale(language: &str) -> Result<Locale> {
    let tag = language.replace('-', "_");
    let tag = match tag.as_str() {
        "en" => "en_US".to_string(),
        "pt" => "pt_BR".to_string(),
        _ => tag,
    };
    Locale::try_from(tag.as_str()).map_err(|_| anyhow!("unsupported language: {}", language))
}
