//! Show pairing, last attempt, and server health.

use anyhow::Result;
use std::path::Path;
use sync_client::{HttpRemoteStore, JsonFileSettings, RemoteStore, SettingsStore, SyncStatus};

/// Run the status command.
pub async fn run(data_dir: &Path) -> Result<()> {
    println!("=== marksync status ===");
    println!();

    let store = JsonFileSettings::new(super::settings_path(data_dir));
    let settings = store.load()?;

    match settings.sync_id {
        Some(id) => {
            println!("Pairing:");
            println!("  Server: {}", settings.server_url);
            // Truncated: the id is the access credential for the record
            println!("  Id:     {id:?}");
            println!(
                "  Auto:   {} (every {} min)",
                if settings.auto_sync_enabled {
                    "enabled"
                } else {
                    "disabled"
                },
                settings.interval_minutes
            );
        }
        None => {
            println!("Pairing: NOT CONFIGURED");
            println!();
            println!("Run 'marksync init' to pair.");
            return Ok(());
        }
    }

    println!();
    println!("Last attempt:");
    match settings.last_attempt_at {
        Some(ts) => println!("  At:     {}", ts.to_rfc3339()),
        None => println!("  At:     never"),
    }
    match settings.last_sync_status {
        Some(SyncStatus::Success) => println!("  Result: ok"),
        Some(SyncStatus::Error { message }) => println!("  Result: error ({message})"),
        None => println!("  Result: -"),
    }
    if let Some(ts) = settings.last_known_modified {
        println!("  Server record: {}", ts.to_rfc3339());
    }

    println!();
    let remote = HttpRemoteStore::new(&settings.server_url)?;
    match remote.status().await {
        Ok(s) => println!(
            "Server: {} (v{}, max blob {} bytes)",
            s.status, s.version, s.max_sync_size
        ),
        Err(e) => println!("Server: unreachable ({e})"),
    }
    Ok(())
}
