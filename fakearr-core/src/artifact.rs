//! Request path routing
//!
//! Turns an inbound URL path into the artifact a client asked for. The base
//! name is the final path segment, percent-decoded, with its last extension
//! removed; the base name itself may contain dots.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::nzb::NZB_CONTENT_TYPE;
use crate::torrent::TORRENT_CONTENT_TYPE;

static ARTIFACT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<base>.+)\.(?P<extension>[^.]+)$").expect("artifact name pattern is valid")
});

/// Metadata formats the server can synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Torrent,
    Nzb,
}

impl ArtifactKind {
    /// Every supported kind, in dispatch order.
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Torrent, ArtifactKind::Nzb];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Torrent => "torrent",
            ArtifactKind::Nzb => "nzb",
        }
    }

    /// MIME type of the synthesized payload.
    pub fn content_type(self) -> &'static str {
        match self {
            ArtifactKind::Torrent => TORRENT_CONTENT_TYPE,
            ArtifactKind::Nzb => NZB_CONTENT_TYPE,
        }
    }

    /// Looks up the kind served under `extension`. Matching is case-sensitive.
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension() == extension)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What a request asked for: a base name and the format to render it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedArtifact {
    pub base_name: String,
    pub kind: ArtifactKind,
}

impl RequestedArtifact {
    /// Name of the file handed to the client, `<base_name>.<extension>`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.base_name, self.kind.extension())
    }
}

/// Reasons a path does not name a supported artifact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("Path does not name a file: {path}")]
    MalformedRequest { path: String },

    #[error("Unsupported extension: .{extension}")]
    UnsupportedExtension { extension: String },
}

/// Characters a name may not carry into a header or an XML document.
pub(crate) fn is_forbidden_char(c: char) -> bool {
    c.is_control() || matches!(c, '\u{FFFE}' | '\u{FFFF}')
}

/// Parses a request path into the artifact it names.
///
/// Only the final raw segment is decoded, so an encoded `/` stays part of
/// the name.
///
/// # Errors
/// - `RouteError::MalformedRequest` - No extension, empty base name, invalid
///   percent-encoding or a control character in the name
/// - `RouteError::UnsupportedExtension` - Extension other than `torrent` or `nzb`
///
/// # Examples
/// ```
/// use fakearr_core::{ArtifactKind, route};
///
/// let artifact = route("/My.Show.S01E01.torrent").unwrap();
/// assert_eq!(artifact.base_name, "My.Show.S01E01");
/// assert_eq!(artifact.kind, ArtifactKind::Torrent);
/// assert!(route("/noext").is_err());
/// ```
pub fn route(path: &str) -> Result<RequestedArtifact, RouteError> {
    let malformed = || RouteError::MalformedRequest {
        path: path.to_string(),
    };

    let segment = path.rsplit('/').next().unwrap_or_default();
    let file_name = urlencoding::decode(segment).map_err(|_| malformed())?;
    if file_name.chars().any(is_forbidden_char) {
        return Err(malformed());
    }

    let captures = ARTIFACT_NAME.captures(&file_name).ok_or_else(malformed)?;
    let base_name = &captures["base"];
    let extension = &captures["extension"];

    let kind = ArtifactKind::from_extension(extension).ok_or_else(|| {
        RouteError::UnsupportedExtension {
            extension: extension.to_string(),
        }
    })?;

    Ok(RequestedArtifact {
        base_name: base_name.to_string(),
        kind,
    })
}
