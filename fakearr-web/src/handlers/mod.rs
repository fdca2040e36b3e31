//! HTTP request handlers organized by functionality

pub mod artifact;
pub mod newznab;
pub mod utils;

// Re-export handler functions
pub use artifact::serve_artifact;
pub use newznab::{ApiQuery, newznab_api};
pub use utils::{content_disposition, health, not_found};
