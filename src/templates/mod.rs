//! Built-in spacetraveling templates using Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers::{encode_slug, exit_preview_button, text_with_icon};
use crate::i18n::I18n;

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(i18n: &I18n) -> Result<Self> {
        let mut tera = Tera::default();

        // Register all templates
        tera.add_raw_templates(vec![
            ("layout.html", include_str!("spacetraveling/layout.html")),
            ("home.html", include_str!("spacetraveling/home.html")),
            ("post.html", include_str!("spacetraveling/post.html")),
            ("loading.html", include_str!("spacetraveling/loading.html")),
            ("not_found.html", include_str!("spacetraveling/not_found.html")),
            // Partials
            (
                "partials/post_summary.html",
                include_str!("spacetraveling/partials/post_summary.html"),
            ),
        ])?;

        // Register components and translations
        tera.register_filter("slug", slug_filter);
        tera.register_function("text_with_icon", text_with_icon_function);
        let exit_label = i18n.get("exit_preview");
        tera.register_function(
            "exit_preview",
            move |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
                let enabled = args.get("enabled").and_then(|v| v.as_bool()).unwrap_or(false);
                Ok(tera::Value::String(exit_preview_button(enabled, &exit_label)))
            },
        );
        let translations = i18n.clone();
        tera.register_function(
            "t",
            move |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
                let key = match args.get("key") {
                    Some(val) => tera::try_get_value!("t", "key", String, val),
                    None => return Err(tera::Error::msg("t() requires a `key` argument")),
                };
                Ok(tera::Value::String(translations.get(&key)))
            },
        );

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: a post slug as one URL path segment
fn slug_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let slug = tera::try_get_value!("slug", "value", String, value);
    Ok(tera::Value::String(encode_slug(&slug)))
}

/// Tera function: icon followed by text
fn text_with_icon_function(args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    let icon = match args.get("icon") {
        Some(val) => tera::try_get_value!("text_with_icon", "icon", String, val),
        None => return Err(tera::Error::msg("text_with_icon() requires `icon`")),
    };
    let text = match args.get("text") {
        Some(tera::Value::String(s)) => s.clone(),
        Some(tera::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    Ok(tera::Value::String(text_with_icon(&icon, &text)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub first_publication_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub first_publication_date: String,
    pub edited_at: Option<String>,
    /// e.g. "4 min"
    pub reading_time: String,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub heading: String,
    /// Rendered rich text
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavView {
    pub uid: String,
    pub title: String,
}
