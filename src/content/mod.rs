//! Content module - post models and rich text processing

mod post;
pub mod rich_text;

pub use post::{
    count_words, reading_time, Banner, NavPost, Post, PostData, PostSummary, Section, SummaryData,
    TitleData, WORDS_PER_MINUTE,
};
pub use rich_text::Block;
