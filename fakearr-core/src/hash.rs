//! Piece hash generation for synthesized torrents
//!
//! Produces the fixed-width 20-byte values a descriptor's `pieces` field is
//! made of. Two sources exist: a SHA-1 digest over the piece index and base
//! name, and a ChaCha20 generator owned by the source instance.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng, TryRngCore};
use rand_chacha::ChaCha20Rng;
use sha1::{Digest, Sha1};

use crate::config::{HashMode, HashingConfig};

/// Width of every piece hash and info-hash in bytes.
pub const HASH_WIDTH: usize = 20;

/// Opaque 20-byte identifier used for piece hashes and info-hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashValue([u8; HASH_WIDTH]);

impl HashValue {
    /// Creates HashValue from raw bytes.
    pub fn new(bytes: [u8; HASH_WIDTH]) -> Self {
        Self(bytes)
    }

    /// SHA-1 digest over the concatenation of `parts`.
    pub fn digest(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha1::new();
        for part in parts {
            hasher.update(part);
        }
        let digest = hasher.finalize();

        let mut bytes = [0u8; HASH_WIDTH];
        bytes.copy_from_slice(&digest[..HASH_WIDTH]);
        Self(bytes)
    }

    /// Returns reference to underlying 20 bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_WIDTH] {
        &self.0
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Errors from a hash source.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("Random source unavailable: {reason}")]
    RandomSourceUnavailable { reason: String },
}

/// Source of piece hashes.
///
/// Implementations are shared across concurrent requests, so they must be
/// callable through `&self` from many tasks at once.
pub trait HashSource: Send + Sync {
    /// Produces the hash for piece `index` of the torrent named `base_name`.
    ///
    /// # Errors
    /// - `HashError::RandomSourceUnavailable` - Backing entropy could not be read
    fn piece_hash(&self, index: u32, base_name: &str) -> Result<HashValue, HashError>;

    /// Returns true when equal inputs always give equal outputs.
    fn is_deterministic(&self) -> bool;

    /// Verifies at startup that the source can serve requests.
    ///
    /// # Errors
    /// - `HashError::RandomSourceUnavailable` - Backing entropy could not be read
    fn self_check(&self) -> Result<(), HashError> {
        Ok(())
    }
}

/// SHA-1 over `piece_<index>_<base_name>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicHashSource;

impl HashSource for DeterministicHashSource {
    fn piece_hash(&self, index: u32, base_name: &str) -> Result<HashValue, HashError> {
        let seed = format!("piece_{index}_{base_name}");
        Ok(HashValue::digest(&[seed.as_bytes()]))
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}

/// Draws hashes from a ChaCha20 generator owned by this source.
///
/// The generator sits behind a mutex so concurrent requests each advance
/// the stream and never see repeated output.
pub struct RandomHashSource {
    rng: Mutex<ChaCha20Rng>,
}

impl RandomHashSource {
    /// Seeds the generator from the operating system.
    ///
    /// # Errors
    /// - `HashError::RandomSourceUnavailable` - OS entropy could not be read
    pub fn from_os_rng() -> Result<Self, HashError> {
        let rng = ChaCha20Rng::try_from_os_rng().map_err(|e| {
            HashError::RandomSourceUnavailable {
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            rng: Mutex::new(rng),
        })
    }

    /// Seeds the generator with a fixed value for reproducible runs.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }
}

impl HashSource for RandomHashSource {
    fn piece_hash(&self, _index: u32, _base_name: &str) -> Result<HashValue, HashError> {
        let mut bytes = [0u8; HASH_WIDTH];
        self.rng.lock().fill_bytes(&mut bytes);
        Ok(HashValue::new(bytes))
    }

    fn is_deterministic(&self) -> bool {
        false
    }

    fn self_check(&self) -> Result<(), HashError> {
        let mut probe = [0u8; HASH_WIDTH];
        OsRng
            .try_fill_bytes(&mut probe)
            .map_err(|e| HashError::RandomSourceUnavailable {
                reason: e.to_string(),
            })
    }
}

/// Builds the hash source selected by configuration.
///
/// # Errors
/// - `HashError::RandomSourceUnavailable` - Random mode without a seed and no OS entropy
pub fn hash_source_from_config(config: &HashingConfig) -> Result<Arc<dyn HashSource>, HashError> {
    match (config.mode, config.seed) {
        (HashMode::Deterministic, _) => Ok(Arc::new(DeterministicHashSource)),
        (HashMode::Random, Some(seed)) => Ok(Arc::new(RandomHashSource::from_seed(seed))),
        (HashMode::Random, None) => Ok(Arc::new(RandomHashSource::from_os_rng()?)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_deterministic_source_is_stable() {
        let source = DeterministicHashSource;
        let first = source.piece_hash(7, "show").unwrap();
        let second = source.piece_hash(7, "show").unwrap();

        assert_eq!(first, second);
        assert_eq!(first, HashValue::digest(&[b"piece_7_show".as_slice()]));
        assert!(source.is_deterministic());
    }

    #[test]
    fn test_deterministic_source_varies_with_index_and_name() {
        let source = DeterministicHashSource;
        let base = source.piece_hash(0, "show").unwrap();

        assert_ne!(base, source.piece_hash(1, "show").unwrap());
        assert_ne!(base, source.piece_hash(0, "other").unwrap());
    }

    #[test]
    fn test_seeded_random_source_is_reproducible() {
        let a = RandomHashSource::from_seed(42);
        let b = RandomHashSource::from_seed(42);

        for index in 0..4 {
            assert_eq!(
                a.piece_hash(index, "x").unwrap(),
                b.piece_hash(index, "x").unwrap()
            );
        }
        assert!(!a.is_deterministic());
    }

    #[test]
    fn test_random_source_does_not_repeat_across_threads() {
        let source = Arc::new(RandomHashSource::from_seed(7));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let source = Arc::clone(&source);
                std::thread::spawn(move || {
                    (0..64)
                        .map(|i| source.piece_hash(i, "x").unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for hash in handle.join().unwrap() {
                assert!(seen.insert(hash), "duplicate hash {hash}");
            }
        }
        assert_eq!(seen.len(), 256);
    }

    #[test]
    fn test_os_random_source_passes_self_check() {
        let source = RandomHashSource::from_os_rng().unwrap();
        assert!(source.self_check().is_ok());
    }

    #[test]
    fn test_source_from_config() {
        let deterministic = hash_source_from_config(&HashingConfig::default()).unwrap();
        assert!(deterministic.is_deterministic());

        let random = hash_source_from_config(&HashingConfig {
            mode: HashMode::Random,
            seed: Some(1),
        })
        .unwrap();
        assert!(!random.is_deterministic());
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        let hash = HashValue::new([0xab; HASH_WIDTH]);
        assert_eq!(hash.to_string(), "ab".repeat(HASH_WIDTH));
    }
}
