//! Post models and reading time

use serde::Deserialize;

use super::rich_text::{self, Block};
use crate::cms::Document;

/// Average reading speed used for the reading-time estimate
pub const WORDS_PER_MINUTE: usize = 200;

/// Full post content
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PostData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<Section>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Banner {
    pub url: Option<String>,
}

/// A headed section of a post
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Section {
    pub heading: String,
    pub body: Vec<Block>,
}

/// Fields shown in the post listing
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SummaryData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// Fields needed to link to a neighbouring post
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TitleData {
    pub title: String,
}

/// A blog post
pub type Post = Document<PostData>;

/// A post as shown in the listing
pub type PostSummary = Document<SummaryData>;

/// The previous or next post
pub type NavPost = Document<TitleData>;

/// Count whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimated minutes to read all sections, never less than one
pub fn reading_time(sections: &[Section]) -> usize {
    let words: usize = sections
        .iter()
        .map(|section| {
            count_words(&section.heading) + count_words(&rich_text::as_text(&section.body))
        })
        .sum();

    words.div_ceil(WORDS_PER_MINUTE).max(1)
}
