//! Configuration module

mod site;

pub use site::CommentsConfig;
pub use site::FallbackMode;
pub use site::ListingConfig;
pub use site::PostConfig;
pub use site::PreviewConfig;
pub use site::SiteConfig;
