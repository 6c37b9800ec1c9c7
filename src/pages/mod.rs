//! Page data loading
//!
//! Each page fetches its props from the content API; the generator turns
//! props into HTML.

pub mod home;
pub mod post;

/// Document type holding blog posts
pub const POST_TYPE: &str = "posts";
