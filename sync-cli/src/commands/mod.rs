//! Command implementations.

pub mod init;
pub mod status;
pub mod sync;
pub mod unlink;

use std::path::{Path, PathBuf};

/// Path of the persisted settings file inside the data directory.
pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

/// Path of the local bookmark tree inside the data directory.
pub fn bookmarks_path(data_dir: &Path) -> PathBuf {
    data_dir.join("bookmarks.json")
}
