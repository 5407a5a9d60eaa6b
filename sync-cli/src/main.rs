//! # deltasync
//!
//! CLI for offline-first change-list sync.
//!
//! ## Commands
//!
//! - `sync`: Bring the local caches up to date with a remote fixture
//! - `status`: Show cursors and cached entity counts
//! - `search`: Search the synced caches
//!
//! ## Example
//!
//! ```bash
//! # Sync from a fixture, resuming from the stored cursors
//! deltasync sync --remote remote.json
//!
//! # Inspect progress
//! deltasync status
//!
//! # Search what was synced
//! deltasync search compose
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod state;

use commands::{search, status, sync};

/// CLI for offline-first change-list sync.
#[derive(Parser, Debug)]
#[command(name = "deltasync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for cursors, caches and the search index
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync the local caches with a remote
    Sync {
        /// JSON fixture serving topics and news resources
        #[arg(long)]
        remote: PathBuf,

        /// TOML configuration (default: <data-dir>/sync.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show sync status
    Status,

    /// Search synced topics and news resources
    Search {
        /// Words to look for (all must match)
        term: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    match cli.command {
        Commands::Sync { remote, config } => {
            sync::run(&data_dir, &remote, config.as_deref()).await?;
        }
        Commands::Status => {
            status::run(&data_dir).await?;
        }
        Commands::Search { term } => {
            search::run(&data_dir, &term).await?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Get the default data directory for deltasync.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "ydun", "deltasync")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sync_with_global_flags() {
        let cli = Cli::try_parse_from([
            "deltasync",
            "sync",
            "--remote",
            "remote.json",
            "--data-dir",
            "/tmp/ds",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/ds")));
        match cli.command {
            Commands::Sync { remote, config } => {
                assert_eq!(remote, PathBuf::from("remote.json"));
                assert!(config.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn sync_requires_remote() {
        assert!(Cli::try_parse_from(["deltasync", "sync"]).is_err());
    }
}
