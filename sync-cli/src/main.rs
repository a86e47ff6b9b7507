//! # marksync
//!
//! CLI client for MarkSync encrypted bookmark synchronization.
//!
//! The bookmark tree lives as a JSON file in the data directory; syncing
//! seals it with a key derived from the passphrase and exchanges it with
//! the server, which only ever sees ciphertext.
//!
//! ## Commands
//!
//! - `init`: Pair this machine with a sync record (new or existing)
//! - `sync`: Run one sync attempt now
//! - `status`: Show pairing, last attempt, and server health
//! - `unlink`: Delete the server-side record and clear the pairing
//!
//! ## Example
//!
//! ```bash
//! # First machine: allocate a record
//! marksync init --server http://localhost:8080
//!
//! # Second machine: join it
//! marksync init --server http://localhost:8080 --join <id>
//!
//! # Either machine
//! marksync sync
//! marksync status
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod bookmarks;
mod commands;

/// CLI client for MarkSync encrypted bookmark synchronization.
#[derive(Parser, Debug)]
#[command(name = "marksync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for settings and the local bookmark file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pair this machine with a sync record (new or existing)
    Init {
        /// Sync server base URL
        #[arg(long, default_value = "http://localhost:8080")]
        server: String,

        /// Join an existing record by id instead of allocating a new one
        #[arg(long)]
        join: Option<String>,

        /// Passphrase (will prompt without echo if not provided)
        #[arg(long, short)]
        passphrase: Option<String>,

        /// Scheduled sync interval in minutes
        #[arg(long, default_value = "15")]
        interval: u32,
    },

    /// Run one sync attempt now
    Sync,

    /// Show pairing, last attempt, and server health
    Status,

    /// Delete the server-side record and clear the pairing
    Unlink,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    match cli.command {
        Commands::Init {
            server,
            join,
            passphrase,
            interval,
        } => {
            commands::init::run(&data_dir, &server, join.as_deref(), passphrase, interval).await?;
        }
        Commands::Sync => {
            commands::sync::run(&data_dir).await?;
        }
        Commands::Status => {
            commands::status::run(&data_dir).await?;
        }
        Commands::Unlink => {
            commands::unlink::run(&data_dir).await?;
        }
    }

    Ok(())
}

/// Get the default data directory for marksync.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "marksync", "marksync")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
