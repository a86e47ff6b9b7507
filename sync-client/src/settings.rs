//! Persisted client sync state.
//!
//! Settings are mutated from two places only: a settings UI (external
//! collaborator) and the sync engine after each attempt. The store trait
//! keeps the engine testable without touching the filesystem.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use sync_types::{SyncId, Timestamp};
use thiserror::Error;

/// Outcome tag of the most recent sync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncStatus {
    /// The attempt completed.
    Success,
    /// The attempt failed; `message` distinguishes e.g. a wrong passphrase
    /// from a network outage in any user-facing status display.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

/// The client's persisted sync state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Identifier of the record on the server, once paired.
    pub sync_id: Option<SyncId>,
    /// Passphrase the encryption key is derived from.
    pub passphrase: Option<String>,
    /// Base URL of the sync server.
    pub server_url: String,
    /// Server modification time of the last snapshot this client uploaded
    /// or downloaded. `None` until the first successful sync.
    pub last_known_modified: Option<Timestamp>,
    /// Whether syncing is enabled at all.
    pub auto_sync_enabled: bool,
    /// Scheduled sync interval in minutes.
    pub interval_minutes: u32,
    /// Status tag of the last attempt.
    pub last_sync_status: Option<SyncStatus>,
    /// When the last attempt started. Due-ness for scheduled syncs is
    /// computed from this persisted value, never from an in-memory timer,
    /// so it survives process restarts.
    pub last_attempt_at: Option<Timestamp>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            sync_id: None,
            passphrase: None,
            server_url: "http://localhost:8080".to_string(),
            last_known_modified: None,
            auto_sync_enabled: false,
            interval_minutes: 15,
            last_sync_status: None,
            last_attempt_at: None,
        }
    }
}

impl SyncSettings {
    /// Whether the minimum configuration for a sync attempt is present.
    pub fn is_configured(&self) -> bool {
        self.sync_id.is_some() && self.passphrase.is_some() && self.auto_sync_enabled
    }
}

/// Settings persistence errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Filesystem failure.
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON.
    #[error("settings file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage seam for [`SyncSettings`].
pub trait SettingsStore: Send + Sync {
    /// Load the current settings. A missing backing file yields defaults.
    fn load(&self) -> Result<SyncSettings, SettingsError>;

    /// Persist the settings, fully replacing the previous state.
    fn save(&self, settings: &SyncSettings) -> Result<(), SettingsError>;
}

/// [`SettingsStore`] backed by a JSON file.
///
/// Writes go through a temporary sibling and a rename, so a crash mid-save
/// never leaves a torn settings file.
#[derive(Debug)]
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    /// Create a store persisting to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileSettings {
    fn load(&self) -> Result<SyncSettings, SettingsError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SyncSettings::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, settings: &SyncSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory [`SettingsStore`] for tests.
#[derive(Debug, Default)]
pub struct MemorySettings {
    inner: Mutex<SyncSettings>,
}

impl MemorySettings {
    /// Create a store holding the given settings.
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            inner: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> Result<SyncSettings, SettingsError> {
        Ok(self.inner.lock().unwrap().clone())
    }

    fn save(&self, settings: &SyncSettings) -> Result<(), SettingsError> {
        *self.inner.lock().unwrap() = settings.clone();
        Ok(())
    }
}
