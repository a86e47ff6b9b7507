//! Run one sync attempt.

use crate::bookmarks::FileBookmarks;
use anyhow::Result;
use std::path::Path;
use sync_client::{HttpRemoteStore, JsonFileSettings, SettingsStore, SyncEngine, SyncOutcome};

/// Run the sync command.
pub async fn run(data_dir: &Path) -> Result<()> {
    let store = JsonFileSettings::new(super::settings_path(data_dir));
    let settings = store.load()?;

    let remote = HttpRemoteStore::new(&settings.server_url)?;
    let bookmarks = FileBookmarks::new(super::bookmarks_path(data_dir));
    let engine = SyncEngine::new(remote, store, bookmarks);

    match engine.sync().await? {
        SyncOutcome::Uploaded { last_modified } => {
            println!("Uploaded local bookmarks (server time {})", last_modified.to_rfc3339());
        }
        SyncOutcome::Downloaded { last_modified } => {
            println!("Downloaded server bookmarks ({})", last_modified.to_rfc3339());
        }
        SyncOutcome::UpToDate => {
            println!("Already up to date.");
        }
        SyncOutcome::NotConfigured => {
            println!("Not configured. Run 'marksync init' first.");
        }
        SyncOutcome::NotDue | SyncOutcome::AlreadyRunning => {
            println!("Sync skipped.");
        }
    }
    Ok(())
}
