//! Fakearr Web - Decoy metadata HTTP server

#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
//!
//! Serves synthesized `.torrent` and `.nzb` files for any requested name and
//! answers enough of the Newznab API for indexer managers to register it.

pub mod error;
pub mod handlers;
pub mod server;

// Re-export main types
pub use error::WebError;
pub use server::{AppState, build_router, run_server};
