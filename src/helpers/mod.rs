//! Helper functions for pages and templates
//!
//! Date formatting, escaping and the small presentational components that
//! templates call as functions.

mod date;
mod html;

pub use date::*;
pub use html::*;
