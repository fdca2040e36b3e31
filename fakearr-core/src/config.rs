//! Centralized configuration for Fakearr.
//!
//! All tunable parameters of the synthesized artifacts are defined here to
//! avoid hard-coded values scattered throughout the codebase.

use std::fmt;
use std::str::FromStr;

/// Central configuration for all Fakearr components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct FakearrConfig {
    pub server: ServerConfig,
    pub torrent: TorrentConfig,
    pub nzb: NzbConfig,
    pub hashing: HashingConfig,
    pub newznab: NewznabConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind to
    pub host: String,
    /// TCP port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// Returns the `host:port` pair the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Torrent descriptor parameters.
///
/// The declared length is never backed by data; it only fixes how many
/// piece hashes the descriptor carries.
#[derive(Debug, Clone)]
pub struct TorrentConfig {
    /// Size of each piece in bytes
    pub piece_length: u32,
    /// Declared total file length in bytes
    pub total_length: u64,
    /// Tracker announce URL
    pub announce_url: String,
    /// Value of the `created by` key
    pub created_by: String,
    /// Unix timestamp for `creation date`; `None` uses the current time
    pub creation_date: Option<i64>,
}

impl Default for TorrentConfig {
    fn default() -> Self {
        Self {
            piece_length: 262_144,          // 256 KiB
            total_length: 1_073_741_824,    // 1 GiB
            announce_url: "http://tracker.example.com/announce".to_string(),
            created_by: "Fakearr".to_string(),
            creation_date: Some(1_711_584_000),
        }
    }
}

/// NZB document parameters.
#[derive(Debug, Clone)]
pub struct NzbConfig {
    /// Value of the `category` head metadata entry
    pub category: String,
    /// Poster attribute of the file entry
    pub poster: String,
    /// Unix timestamp for the file entry; `None` uses the current time
    pub date: Option<i64>,
    /// Newsgroups listed for the file entry
    pub groups: Vec<String>,
    /// Number of segments in the file entry
    pub segment_count: u32,
    /// Declared size of each segment in bytes
    pub segment_size: u64,
    /// Domain used for segment message references
    pub reference_domain: String,
}

impl Default for NzbConfig {
    fn default() -> Self {
        Self {
            category: "TV".to_string(),
            poster: "Fakearr <fakearr@example.com>".to_string(),
            date: Some(1_711_584_000),
            groups: vec!["alt.binaries.tv".to_string()],
            segment_count: 10,
            segment_size: 104_857_600, // 100 MiB
            reference_domain: "example.com".to_string(),
        }
    }
}

/// Strategy used to fill piece hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum HashMode {
    /// SHA-1 over the piece index and base name; same name, same torrent
    #[default]
    Deterministic,
    /// Bytes drawn from a ChaCha20 generator seeded at startup
    Random,
}

impl FromStr for HashMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deterministic" => Ok(HashMode::Deterministic),
            "random" => Ok(HashMode::Random),
            _ => Err(ConfigError::InvalidValue {
                key: "hash mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashMode::Deterministic => write!(f, "deterministic"),
            HashMode::Random => write!(f, "random"),
        }
    }
}

/// Hash generator configuration.
#[derive(Debug, Clone, Default)]
pub struct HashingConfig {
    pub mode: HashMode,
    /// Fixed generator seed for random mode; `None` seeds from the OS
    pub seed: Option<u64>,
}

/// Newznab indexer emulation settings.
#[derive(Debug, Clone)]
pub struct NewznabConfig {
    /// Public base URL that item links point at
    pub base_url: String,
    /// Indexer title advertised in capabilities and feeds
    pub title: String,
}

impl Default for NewznabConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            title: "Fakearr".to_string(),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

impl FakearrConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Unparseable values are logged and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("FAKEARR_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("FAKEARR_PORT") {
            match port.parse::<u16>() {
                Ok(port) => config.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid FAKEARR_PORT: {port}"),
            }
        }

        if let Ok(mode) = std::env::var("FAKEARR_HASH_MODE") {
            match mode.parse::<HashMode>() {
                Ok(mode) => config.hashing.mode = mode,
                Err(e) => tracing::warn!("Ignoring FAKEARR_HASH_MODE: {e}"),
            }
        }

        if let Ok(seed) = std::env::var("FAKEARR_HASH_SEED") {
            match seed.parse::<u64>() {
                Ok(seed) => config.hashing.seed = Some(seed),
                Err(_) => tracing::warn!("Ignoring invalid FAKEARR_HASH_SEED: {seed}"),
            }
        }

        if let Ok(url) = std::env::var("FAKEARR_ANNOUNCE_URL") {
            config.torrent.announce_url = url;
        }

        if let Ok(category) = std::env::var("FAKEARR_CATEGORY") {
            config.nzb.category = category;
        }

        if let Ok(base_url) = std::env::var("FAKEARR_BASE_URL") {
            config.newznab.base_url = base_url.trim_end_matches('/').to_string();
        }

        config
    }

    /// Creates a configuration for tests: deterministic hashes, fixed dates.
    pub fn for_testing() -> Self {
        Self {
            hashing: HashingConfig {
                mode: HashMode::Deterministic,
                seed: None,
            },
            ..Default::default()
        }
    }

    /// Checks the internal consistency rules the synthesizers rely on.
    ///
    /// # Errors
    /// - `ConfigError::Invalid` - A size or count is zero, or no newsgroup is set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.torrent.piece_length == 0 {
            return Err(ConfigError::Invalid {
                reason: "piece length must be positive".to_string(),
            });
        }
        if self.torrent.total_length == 0 {
            return Err(ConfigError::Invalid {
                reason: "total length must be positive".to_string(),
            });
        }
        if i64::try_from(self.torrent.total_length).is_err() {
            return Err(ConfigError::Invalid {
                reason: "total length does not fit a bencode integer".to_string(),
            });
        }
        if self.nzb.segment_count == 0 {
            return Err(ConfigError::Invalid {
                reason: "segment count must be positive".to_string(),
            });
        }
        if self.nzb.segment_size == 0 {
            return Err(ConfigError::Invalid {
                reason: "segment size must be positive".to_string(),
            });
        }
        if self.nzb.groups.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "at least one newsgroup is required".to_string(),
            });
        }
        Ok(())
    }
}
