//! Fakearr CLI - Command-line interface
//!
//! Runs the decoy server or synthesizes a single file to disk.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use fakearr_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "fakearr")]
#[command(about = "Decoy torrent and NZB metadata server")]
#[command(version)]
struct Cli {
    /// Console log level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value_t = CliLogLevel::Info, global = true)]
    log_level: CliLogLevel,

    /// Also write a full trace of this run into this directory
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())?;

    commands::handle_command(cli.command).await
}
