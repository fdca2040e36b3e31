//! Torrent descriptor synthesis and the bencode format it is written in

pub mod bencode;
pub mod creation;
pub mod descriptor;

pub use bencode::{BencodeError, DictBuilder, Value};
pub use creation::TorrentSynthesizer;
pub use descriptor::{InfoDictionary, TorrentDescriptor};

/// Content type served for `.torrent` payloads.
pub const TORRENT_CONTENT_TYPE: &str = "application/x-bittorrent";

/// Errors that can occur while building or reading a torrent descriptor.
#[derive(Debug, thiserror::Error)]
pub enum TorrentError {
    #[error("Failed to parse torrent file: {reason}")]
    InvalidTorrentFile { reason: String },

    #[error("Value of '{field}' does not fit a bencode integer")]
    IntegerOverflow { field: &'static str },

    #[error("Bencode error: {0}")]
    Bencode(#[from] BencodeError),
}
