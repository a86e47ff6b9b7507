//! Pair this machine with a sync record.

use anyhow::{Context, Result};
use std::path::Path;
use sync_client::{HttpRemoteStore, JsonFileSettings, RemoteStore, SettingsStore};
use sync_types::SyncId;

/// Run the init command.
pub async fn run(
    data_dir: &Path,
    server: &str,
    join: Option<&str>,
    passphrase: Option<String>,
    interval: u32,
) -> Result<()> {
    let passphrase = match passphrase {
        Some(p) => p,
        None => rpassword::prompt_password("Passphrase: ").context("Failed to read passphrase")?,
    };
    anyhow::ensure!(!passphrase.is_empty(), "passphrase must not be empty");
    anyhow::ensure!(interval > 0, "interval must be at least 1 minute");

    let remote = HttpRemoteStore::new(server)?;
    let sync_id = match join {
        Some(raw) => raw
            .parse::<SyncId>()
            .context("invalid sync id (expected the 36-character form)")?,
        None => {
            let id = remote
                .create()
                .await
                .context("server did not allocate an id")?;
            println!("Allocated sync id: {id}");
            println!("Use 'marksync init --join {id}' on other machines.");
            id
        }
    };

    let store = JsonFileSettings::new(super::settings_path(data_dir));
    let mut settings = store.load()?;
    settings.sync_id = Some(sync_id);
    settings.passphrase = Some(passphrase);
    settings.server_url = server.trim_end_matches('/').to_string();
    settings.auto_sync_enabled = true;
    settings.interval_minutes = interval;
    // Fresh pairing: forget any state from a previous record
    settings.last_known_modified = None;
    settings.last_sync_status = None;
    settings.last_attempt_at = None;
    store.save(&settings)?;

    println!("Paired with {server}");
    println!("Bookmarks file: {}", super::bookmarks_path(data_dir).display());
    println!("Run 'marksync sync' to sync.");
    Ok(())
}
