//! Structured rich text: plain-text projection and HTML rendering

use serde::Deserialize;

use crate::helpers::html_escape;

/// One rich-text block
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Block {
    /// `paragraph`, `heading1`..`heading6`, `preformatted`, `list-item`,
    /// `o-list-item`, `image`, `embed`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub spans: Vec<Span>,

    /// Image source
    #[serde(default)]
    pub url: Option<String>,

    /// Image alt text
    #[serde(default)]
    pub alt: Option<String>,

    /// Embed payload (oEmbed)
    #[serde(default)]
    pub oembed: Option<serde_json::Value>,
}

/// Inline formatting over a character range of a block's text
#[derive(Debug, Clone, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
}

impl Block {
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: "paragraph".to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }
}

/// Concatenate the text of all blocks, separated by a space
pub fn as_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render blocks to HTML; consecutive list items are grouped into one list
pub fn as_html(blocks: &[Block]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list_tag = match block.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        let inline = render_spans(&block.text, &block.spans);
        match block.kind.as_str() {
            "paragraph" => html.push_str(&format!("<p>{}</p>", inline)),
            "preformatted" => html.push_str(&format!("<pre>{}</pre>", inline)),
            "list-item" | "o-list-item" => html.push_str(&format!("<li>{}</li>", inline)),
            "image" => {
                if let Some(url) = &block.url {
                    html.push_str(&format!(
                        r#"<p class="block-img"><img src="{}" alt="{}"></p>"#,
                        html_escape(url),
                        html_escape(block.alt.as_deref().unwrap_or(""))
                    ));
                }
            }
            "embed" => {
                if let Some(embed) = block
                    .oembed
                    .as_ref()
                    .and_then(|o| o.get("html"))
                    .and_then(|h| h.as_str())
                {
                    html.push_str(&format!(r#"<div class="embed">{}</div>"#, embed));
                }
            }
            kind => match heading_level(kind) {
                Some(level) => html.push_str(&format!("<h{0}>{1}</h{0}>", level, inline)),
                None => {
                    tracing::debug!("Skipping unknown rich text block: {}", kind);
                }
            },
        }
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn heading_level(kind: &str) -> Option<u8> {
    kind.strip_prefix("heading")?
        .parse()
        .ok()
        .filter(|level| (1..=6).contains(level))
}

/// Apply strong/em/hyperlink spans to a block's text
fn render_spans(text: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut opens: Vec<Vec<String>> = vec![Vec::new(); chars.len() + 1];
    let mut closes: Vec<Vec<&'static str>> = vec![Vec::new(); chars.len() + 1];

    for span in spans {
        if span.start >= span.end || span.end > chars.len() {
            continue;
        }
        let (open, close) = match span.kind.as_str() {
            "strong" => ("<strong>".to_string(), "</strong>"),
            "em" => ("<em>".to_string(), "</em>"),
            "hyperlink" => {
                let url = span
                    .data
                    .as_ref()
                    .and_then(|d| d.url.as_deref())
                    .unwrap_or("#");
                (format!(r#"<a href="{}">"#, html_escape(url)), "</a>")
            }
            _ => continue,
        };
        opens[span.start].push(open);
        closes[span.end].insert(0, close);
    }

    let mut html = String::with_capacity(text.len());
    for (i, c) in chars.iter().enumerate() {
        for close in &closes[i] {
            html.push_str(close);
        }
        for open in &opens[i] {
            html.push_str(open);
        }
        match c {
            '\n' => html.push_str("<br>"),
            c => html.push_str(&html_escape(&c.to_string())),
        }
    }
    for close in &closes[chars.len()] {
        html.push_str(close);
    }

    html
}
