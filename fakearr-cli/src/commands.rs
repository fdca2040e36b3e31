//! CLI command implementations

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use fakearr_core::config::{FakearrConfig, HashMode};
use fakearr_core::torrent::TorrentDescriptor;
use fakearr_core::{ArtifactKind, ArtifactSynthesizer, Payload, route};
use tokio::fs;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the decoy HTTP server
    Serve {
        /// Host to bind to (overrides FAKEARR_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (overrides FAKEARR_PORT)
        #[arg(short, long)]
        port: Option<u16>,
        /// Piece hash mode (overrides FAKEARR_HASH_MODE)
        #[arg(long, value_enum)]
        hash_mode: Option<HashMode>,
        /// Seed for random hash mode (overrides FAKEARR_HASH_SEED)
        #[arg(long)]
        hash_seed: Option<u64>,
    },
    /// Synthesize one file, routed exactly like a server request
    Generate {
        /// File name to synthesize, e.g. `My.Show.S01E01.torrent`
        name: String,
        /// Where to write the file (defaults to the name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print a summary of the generated file
        #[arg(long)]
        inspect: bool,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns the error of the command that failed, with context
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = FakearrConfig::from_env();

    match command {
        Commands::Serve {
            host,
            port,
            hash_mode,
            hash_seed,
        } => {
            apply_server_overrides(&mut config, host, port, hash_mode, hash_seed);
            fakearr_web::run_server(config)
                .await
                .context("Server terminated with an error")
        }
        Commands::Generate {
            name,
            output,
            inspect,
        } => generate(&config, &name, output, inspect).await.map(|_| ()),
    }
}

fn apply_server_overrides(
    config: &mut FakearrConfig,
    host: Option<String>,
    port: Option<u16>,
    hash_mode: Option<HashMode>,
    hash_seed: Option<u64>,
) {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(mode) = hash_mode {
        config.hashing.mode = mode;
    }
    if hash_seed.is_some() {
        config.hashing.seed = hash_seed;
    }
}

/// Synthesize `name` and write it to disk
///
/// # Errors
/// - Name is not `<base>.torrent` or `<base>.nzb`
/// - Synthesis failed or the file could not be written
pub async fn generate(
    config: &FakearrConfig,
    name: &str,
    output: Option<PathBuf>,
    inspect: bool,
) -> anyhow::Result<PathBuf> {
    let artifact = route(name).with_context(|| format!("Cannot generate '{name}'"))?;
    let synthesizer = ArtifactSynthesizer::from_config(config)?;
    let payload = synthesizer.synthesize(&artifact)?;

    let path = output.unwrap_or_else(|| PathBuf::from(&payload.file_name));
    fs::write(&path, &payload.body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote {} ({} bytes)", path.display(), payload.body.len());
    if inspect {
        print!("{}", summarize(artifact.kind, &payload)?);
    }

    Ok(path)
}

/// Human-readable summary of a synthesized payload
fn summarize(kind: ArtifactKind, payload: &Payload) -> anyhow::Result<String> {
    let mut summary = String::new();
    match kind {
        ArtifactKind::Torrent => {
            let descriptor = TorrentDescriptor::from_bytes(&payload.body)
                .context("Generated torrent does not decode")?;
            writeln!(summary, "  Name:         {}", descriptor.info.name)?;
            writeln!(summary, "  Announce:     {}", descriptor.announce)?;
            writeln!(summary, "  Length:       {} bytes", descriptor.info.length)?;
            writeln!(summary, "  Piece length: {} bytes", descriptor.info.piece_length)?;
            writeln!(summary, "  Pieces:       {}", descriptor.info.pieces.len())?;
            writeln!(summary, "  Info hash:    {}", descriptor.info_hash()?)?;
        }
        ArtifactKind::Nzb => {
            writeln!(summary, "  Content type: {}", payload.content_type)?;
            writeln!(summary, "  Size:         {} bytes", payload.body.len())?;
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_generate_writes_torrent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.torrent");

        let path = generate(
            &FakearrConfig::for_testing(),
            "My.Show.S01E01.torrent",
            Some(target.clone()),
            false,
        )
        .await
        .unwrap();

        assert_eq!(path, target);
        let bytes = std::fs::read(&target).unwrap();
        let descriptor = TorrentDescriptor::from_bytes(&bytes).unwrap();
        assert_eq!(descriptor.info.name, "My.Show.S01E01");
    }

    #[tokio::test]
    async fn test_generate_writes_nzb() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("show.nzb");

        generate(&FakearrConfig::for_testing(), "show.nzb", Some(target.clone()), true)
            .await
            .unwrap();

        let text = std::fs::read_to_string(&target).unwrap();
        assert!(text.contains("<meta type=\"title\">show</meta>"));
    }

    #[tokio::test]
    async fn test_generate_rejects_unsupported_name() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("show.mkv");

        let result = generate(
            &FakearrConfig::for_testing(),
            "show.mkv",
            Some(target.clone()),
            false,
        )
        .await;

        assert!(result.is_err());
        assert!(!target.exists());
    }

    #[test]
    fn test_torrent_summary() {
        let config = FakearrConfig::for_testing();
        let synthesizer = ArtifactSynthesizer::from_config(&config).unwrap();
        let payload = synthesizer.synthesize(&route("show.torrent").unwrap()).unwrap();

        let summary = summarize(ArtifactKind::Torrent, &payload).unwrap();
        assert!(summary.contains("Name:         show"));
        assert!(summary.contains("Pieces:       4096"));
    }

    #[test]
    fn test_server_overrides() {
        let mut config = FakearrConfig::for_testing();
        apply_server_overrides(
            &mut config,
            Some("127.0.0.1".to_string()),
            Some(9000),
            Some(HashMode::Random),
            Some(7),
        );

        assert_eq!(config.server.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.hashing.mode, HashMode::Random);
        assert_eq!(config.hashing.seed, Some(7));

        let mut untouched = FakearrConfig::for_testing();
        apply_server_overrides(&mut untouched, None, None, None, None);
        assert_eq!(untouched.server.port, 8000);
    }
}
