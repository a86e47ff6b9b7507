//! Delete the server-side record and clear the pairing.

use anyhow::{Context, Result};
use std::path::Path;
use sync_client::{HttpRemoteStore, JsonFileSettings, RemoteStore, SettingsStore};

/// Run the unlink command.
pub async fn run(data_dir: &Path) -> Result<()> {
    let store = JsonFileSettings::new(super::settings_path(data_dir));
    let mut settings = store.load()?;

    let Some(id) = settings.sync_id else {
        println!("Nothing to unlink.");
        return Ok(());
    };

    let remote = HttpRemoteStore::new(&settings.server_url)?;
    remote
        .delete(&id)
        .await
        .context("failed to delete the server record")?;

    settings.sync_id = None;
    settings.passphrase = None;
    settings.auto_sync_enabled = false;
    settings.last_known_modified = None;
    settings.last_sync_status = None;
    settings.last_attempt_at = None;
    store.save(&settings)?;

    println!("Server record deleted; local pairing cleared.");
    println!("The local bookmarks file is untouched.");
    Ok(())
}
