//! File-backed bookmark provider.
//!
//! The CLI keeps the bookmark tree as a JSON file in the data directory;
//! editing that file plays the role a browser plays for other hosts.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sync_client::{BookmarkProvider, ProviderError};

/// [`BookmarkProvider`] backed by a JSON file on disk.
#[derive(Debug)]
pub struct FileBookmarks {
    path: PathBuf,
}

impl FileBookmarks {
    /// Create a provider persisting to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BookmarkProvider for FileBookmarks {
    fn snapshot(&self) -> Result<Vec<u8>, ProviderError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ProviderError::Empty),
            Err(e) => Err(ProviderError::Backend(e.to_string())),
        }
    }

    fn replace(&self, payload: &[u8]) -> Result<(), ProviderError> {
        // Temp-and-rename so an interrupted download never tears the file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, payload)
            .and_then(|()| std::fs::rename(&tmp, &self.path))
            .map_err(|e| ProviderError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_has_no_snapshot() {
        let dir = tempdir().unwrap();
        let provider = FileBookmarks::new(dir.path().join("bookmarks.json"));
        assert!(matches!(provider.snapshot(), Err(ProviderError::Empty)));
    }

    #[test]
    fn replace_then_snapshot_roundtrips() {
        let dir = tempdir().unwrap();
        let provider = FileBookmarks::new(dir.path().join("bookmarks.json"));

        provider.replace(b"{\"title\":\"root\"}").unwrap();
        assert_eq!(provider.snapshot().unwrap(), b"{\"title\":\"root\"}");
    }

    #[test]
    fn replace_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let provider = FileBookmarks::new(dir.path().join("bookmarks.json"));
        provider.replace(b"{}").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("bookmarks.json")]);
    }
}
