//! Torrent synthesis for names with no content behind them
//!
//! Declares a fixed-size single file and fills `pieces` with one hash per
//! piece from the configured hash source. Nothing is read from disk.

use std::sync::Arc;

use super::TorrentError;
use super::descriptor::{InfoDictionary, TorrentDescriptor};
use crate::config::TorrentConfig;
use crate::hash::{HashSource, HashValue};
use crate::synthesis::SynthesisError;

/// Builds `.torrent` descriptors from a base name.
pub struct TorrentSynthesizer {
    config: TorrentConfig,
    hashes: Arc<dyn HashSource>,
}

impl TorrentSynthesizer {
    /// Creates a synthesizer drawing piece hashes from `hashes`.
    pub fn new(config: TorrentConfig, hashes: Arc<dyn HashSource>) -> Self {
        Self { config, hashes }
    }

    /// Number of piece hashes each descriptor carries.
    pub fn piece_count(&self) -> u64 {
        if self.config.piece_length == 0 {
            return 0;
        }
        self.config
            .total_length
            .div_ceil(u64::from(self.config.piece_length))
    }

    /// Builds the descriptor for `base_name`.
    ///
    /// An empty name is accepted and yields an empty `name` string.
    ///
    /// # Errors
    /// - `SynthesisError::Hash` - The hash source failed
    /// - `SynthesisError::Torrent` - Configured sizes cannot be represented
    pub fn build(&self, base_name: &str) -> Result<TorrentDescriptor, SynthesisError> {
        let piece_count = self.piece_count();
        if piece_count == 0 {
            return Err(TorrentError::InvalidTorrentFile {
                reason: "configured sizes yield no pieces".to_string(),
            }
            .into());
        }
        let piece_count = u32::try_from(piece_count)
            .map_err(|_| TorrentError::IntegerOverflow { field: "pieces" })?;

        let pieces = (0..piece_count)
            .map(|index| self.hashes.piece_hash(index, base_name))
            .collect::<Result<Vec<_>, _>>()?;

        let info = InfoDictionary {
            name: base_name.to_string(),
            piece_length: self.config.piece_length,
            length: self.config.total_length,
            pieces,
            private: false,
        };
        let pieces_bytes = info.pieces_bytes();
        let legacy_info_hash = HashValue::digest(&[pieces_bytes.as_slice(), base_name.as_bytes()]);

        Ok(TorrentDescriptor {
            announce: self.config.announce_url.clone(),
            created_by: self.config.created_by.clone(),
            creation_date: self
                .config
                .creation_date
                .unwrap_or_else(|| chrono::Utc::now().timestamp()),
            info,
            legacy_info_hash: Some(legacy_info_hash),
        })
    }

    /// Builds and serializes the descriptor for `base_name`.
    ///
    /// # Errors
    /// - `SynthesisError::Hash` - The hash source failed
    /// - `SynthesisError::Torrent` - Configured sizes cannot be represented
    pub fn synthesize(&self, base_name: &str) -> Result<Vec<u8>, SynthesisError> {
        let descriptor = self.build(base_name)?;
        Ok(descriptor.to_bytes()?)
    }
}
