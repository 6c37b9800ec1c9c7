//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::cms::CmsConfig;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,

    // Content API
    pub cms: CmsConfig,

    // Pages
    pub listing: ListingConfig,
    pub post: PostConfig,

    // Extensions
    pub comments: CommentsConfig,
    pub preview: PreviewConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling.".to_string(),
            language: "pt-BR".to_string(),
            timezone: "America/Sao_Paulo".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            cms: CmsConfig::default(),

            listing: ListingConfig::default(),
            post: PostConfig::default(),

            comments: CommentsConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading {:?}", path.as_ref()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("PRISMIC_API_ENDPOINT").filter(|v| !v.is_empty()) {
            self.cms.endpoint = endpoint;
        }
        if let Some(token) = lookup("PRISMIC_ACCESS_TOKEN").filter(|v| !v.is_empty()) {
            self.cms.access_token = Some(token);
        }
        if let Some(secret) = lookup("PREVIEW_COOKIE_SECRET").filter(|v| !v.is_empty()) {
            self.preview.cookie_secret = secret;
        }
    }
}

/// Listing page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Posts per page, both for the first page and for each "load more"
    pub page_size: u32,
    /// Seconds before the rendered listing is considered stale
    pub revalidate: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 2,
            revalidate: 30,
        }
    }
}

/// How a post that was not prebuilt is generated on first request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// The request waits for generation to finish
    #[default]
    Blocking,
    /// The request gets the loading page while generation runs in the background
    Loading,
}

/// Post page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    /// Seconds before a rendered post is considered stale
    pub revalidate: u64,
    /// Number of most recent posts rendered ahead of time
    pub prebuild: u32,
    pub fallback: FallbackMode,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            revalidate: 60 * 30,
            prebuild: 1,
            fallback: FallbackMode::Blocking,
        }
    }
}

/// utterances comment widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub enable: bool,
    pub repo: String,
    pub issue_term: String,
    pub label: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            repo: "rvieceli/next-1".to_string(),
            issue_term: "pathname".to_string(),
            label: "comment :speech_balloon:".to_string(),
            theme: "photon-dark".to_string(),
        }
    }
}

/// Preview mode configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PreviewConfig {
    /// Secret used to sign the preview cookie, at least 64 bytes
    pub cookie_secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "spacetraveling.");
        assert_eq!(config.listing.page_size, 2);
        assert_eq!(config.listing.revalidate, 30);
        assert_eq!(config.post.revalidate, 1800);
        assert_eq!(config.post.fallback, FallbackMode::Blocking);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
language: en
cms:
  endpoint: https://blog.cdn.prismic.io/api/v2
  access_token: secret
listing:
  page_size: 5
post:
  fallback: loading
comments:
  repo: someone/blog-comments
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.cms.endpoint, "https://blog.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.access_token.as_deref(), Some("secret"));
        assert_eq!(config.listing.page_size, 5);
        assert_eq!(config.listing.revalidate, 30);
        assert_eq!(config.post.fallback, FallbackMode::Loading);
        assert_eq!(config.comments.repo, "someone/blog-comments");
        assert_eq!(config.comments.theme, "photon-dark");
    }

    #[test]
    fn test_overrides() {
        let mut config = SiteConfig::default();
        config.apply_overrides(|key| match key {
            "PRISMIC_API_ENDPOINT" => Some("http://localhost:9999/api/v2".to_string()),
            "PRISMIC_ACCESS_TOKEN" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.cms.endpoint, "http://localhost:9999/api/v2");
        assert_eq!(config.cms.access_token, None);
    }
}
