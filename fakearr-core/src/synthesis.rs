//! Artifact dispatch
//!
//! Maps a routed artifact to the synthesizer for its kind and packages the
//! result with the headers a response needs. The payload is built completely
//! in memory before anything is handed to the transport.

use std::sync::Arc;

use bytes::Bytes;

use crate::artifact::{ArtifactKind, RequestedArtifact};
use crate::config::FakearrConfig;
use crate::hash::{self, HashError, HashSource, HashValue};
use crate::nzb::NzbSynthesizer;
use crate::torrent::{TorrentError, TorrentSynthesizer};
use crate::FakearrError;

/// Errors raised while synthesizing a payload.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Hash generation failed: {0}")]
    Hash(#[from] HashError),

    #[error("Torrent encoding failed: {0}")]
    Torrent(#[from] TorrentError),

    #[error("Encoding failed: {reason}")]
    Encoding { reason: String },
}

/// A fully built response body with its metadata.
#[derive(Debug, Clone)]
pub struct Payload {
    pub body: Bytes,
    pub content_type: &'static str,
    pub file_name: String,
    /// Info-hash of the descriptor, for torrent payloads
    pub info_hash: Option<HashValue>,
}

/// Owns one synthesizer per artifact kind.
pub struct ArtifactSynthesizer {
    torrent: TorrentSynthesizer,
    nzb: NzbSynthesizer,
}

impl ArtifactSynthesizer {
    pub fn new(torrent: TorrentSynthesizer, nzb: NzbSynthesizer) -> Self {
        Self { torrent, nzb }
    }

    /// Validates `config`, builds its hash source and runs the source's
    /// startup self-check.
    ///
    /// # Errors
    /// - `FakearrError::Configuration` - Configuration is inconsistent
    /// - `FakearrError::Hash` - Random mode selected and OS entropy unavailable
    pub fn from_config(config: &FakearrConfig) -> Result<Self, FakearrError> {
        config.validate()?;

        let hashes: Arc<dyn HashSource> = hash::hash_source_from_config(&config.hashing)?;
        hashes.self_check()?;
        tracing::info!(
            "Hash source ready: mode={}, deterministic={}",
            config.hashing.mode,
            hashes.is_deterministic()
        );

        Ok(Self::new(
            TorrentSynthesizer::new(config.torrent.clone(), hashes),
            NzbSynthesizer::new(config.nzb.clone()),
        ))
    }

    /// Synthesizes the payload for `artifact`.
    ///
    /// # Errors
    /// - `SynthesisError` - The selected synthesizer failed
    pub fn synthesize(&self, artifact: &RequestedArtifact) -> Result<Payload, SynthesisError> {
        let (body, info_hash) = match artifact.kind {
            ArtifactKind::Torrent => {
                let descriptor = self.torrent.build(&artifact.base_name)?;
                (descriptor.to_bytes()?, Some(descriptor.info_hash()?))
            }
            ArtifactKind::Nzb => (self.nzb.synthesize(&artifact.base_name)?, None),
        };

        tracing::debug!(
            "Synthesized {} for '{}' ({} bytes)",
            artifact.kind,
            artifact.base_name,
            body.len()
        );

        Ok(Payload {
            body: Bytes::from(body),
            content_type: artifact.kind.content_type(),
            file_name: artifact.file_name(),
            info_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashMode;
    use crate::route;
    use crate::torrent::TorrentDescriptor;

    fn synthesizer() -> ArtifactSynthesizer {
        ArtifactSynthesizer::from_config(&FakearrConfig::for_testing()).unwrap()
    }

    #[test]
    fn test_dispatches_by_kind() {
        let synthesizer = synthesizer();

        let torrent = synthesizer.synthesize(&route("/show.torrent").unwrap()).unwrap();
        assert_eq!(torrent.content_type, "application/x-bittorrent");
        assert_eq!(torrent.file_name, "show.torrent");
        assert!(torrent.body.starts_with(b"d8:announce"));

        let nzb = synthesizer.synthesize(&route("/show.nzb").unwrap()).unwrap();
        assert_eq!(nzb.content_type, "application/x-nzb");
        assert_eq!(nzb.file_name, "show.nzb");
        assert!(nzb.body.starts_with(b"<?xml"));
        assert!(nzb.info_hash.is_none());
    }

    #[test]
    fn test_torrent_payload_reports_info_hash() {
        let payload = synthesizer().synthesize(&route("/show.torrent").unwrap()).unwrap();
        let descriptor = TorrentDescriptor::from_bytes(&payload.body).unwrap();
        assert_eq!(payload.info_hash, Some(descriptor.info_hash().unwrap()));
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut config = FakearrConfig::for_testing();
        config.nzb.segment_size = 0;
        assert!(matches!(
            ArtifactSynthesizer::from_config(&config),
            Err(FakearrError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_config_random_mode() {
        let mut config = FakearrConfig::for_testing();
        config.hashing.mode = HashMode::Random;
        let synthesizer = ArtifactSynthesizer::from_config(&config).unwrap();

        let artifact = route("/show.torrent").unwrap();
        let first = synthesizer.synthesize(&artifact).unwrap();
        let second = synthesizer.synthesize(&artifact).unwrap();
        assert_ne!(first.body, second.body);
    }
}
