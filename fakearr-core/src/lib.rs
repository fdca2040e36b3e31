//! Fakearr Core - Decoy metadata synthesis
//!
//! Builds structurally valid `.torrent` descriptors and NZB documents for
//! names that have no real content behind them, and decides from a request
//! path which of the two a client asked for.

pub mod artifact;
pub mod config;
pub mod hash;
pub mod newznab;
pub mod nzb;
pub mod synthesis;
pub mod torrent;
pub mod tracing_setup;
mod xml;

// Re-export main types for convenient access
pub use artifact::{ArtifactKind, RequestedArtifact, RouteError, route};
pub use config::{ConfigError, FakearrConfig, HashMode};
pub use hash::{HashError, HashSource, HashValue};
pub use newznab::{NewznabError, NewznabFunction, NewznabIndexer, SearchQuery};
pub use nzb::NzbSynthesizer;
pub use synthesis::{ArtifactSynthesizer, Payload, SynthesisError};
pub use torrent::{TorrentDescriptor, TorrentError, TorrentSynthesizer};

/// Errors that can bubble up from any Fakearr subsystem.
#[derive(Debug, thiserror::Error)]
pub enum FakearrError {
    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Newznab error: {0}")]
    Newznab(#[from] NewznabError),

    #[error("Hash source error: {0}")]
    Hash(#[from] HashError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FakearrError {
    /// Returns a message safe to show to a client or terminal user.
    ///
    /// Internal causes (encoding, randomness, I/O) are collapsed into a
    /// generic message so they never leak into a response body.
    pub fn user_message(&self) -> String {
        match self {
            FakearrError::Route(RouteError::MalformedRequest { .. }) => "Not found".to_string(),
            FakearrError::Route(RouteError::UnsupportedExtension { extension }) => {
                format!("Unsupported extension: .{extension}")
            }
            FakearrError::Newznab(_) => "Invalid request".to_string(),
            FakearrError::Synthesis(_) | FakearrError::Hash(_) => {
                "Failed to generate file".to_string()
            }
            FakearrError::Configuration(e) => e.to_string(),
            FakearrError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, FakearrError::Route(_) | FakearrError::Newznab(_))
    }
}

pub type Result<T> = std::result::Result<T, FakearrError>;
