//! Filesystem-backed blob store.
//!
//! Layout: one `{id}.blob` file per sync id under the data root. Writes
//! land in a uniquely named temporary sibling and are renamed into place,
//! so a concurrent reader observes either the full old or the full new
//! blob, never a torn one. An open read handle keeps its snapshot across
//! a concurrent rename.

use super::BlobStore;
use crate::error::StorageError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use sync_types::{SyncId, Timestamp};
use tokio::io::AsyncReadExt;

/// Distinguishes temp files of concurrent writes within one process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Filesystem implementation of [`BlobStore`].
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    max_blob_size: usize,
}

impl FsBlobStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>, max_blob_size: usize) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            max_blob_size,
        })
    }

    fn blob_path(&self, id: &SyncId) -> PathBuf {
        self.root.join(format!("{id}.blob"))
    }

    fn temp_path(&self, id: &SyncId) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!("{id}.blob.tmp-{}-{seq}", std::process::id()))
    }
}

async fn modified(path: &Path) -> Result<Timestamp, StorageError> {
    let meta = tokio::fs::metadata(path).await?;
    Ok(Timestamp::from(meta.modified()?))
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, id: &SyncId) -> Result<Option<(Vec<u8>, Timestamp)>, StorageError> {
        let path = self.blob_path(id);
        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // Metadata through the open handle, so body and mtime belong to
        // the same blob even if a rename lands concurrently.
        let meta = file.metadata().await?;
        let ts = Timestamp::from(meta.modified()?);
        let mut body = Vec::with_capacity(meta.len() as usize);
        file.read_to_end(&mut body).await?;
        Ok(Some((body, ts)))
    }

    async fn put(&self, id: &SyncId, body: &[u8]) -> Result<Timestamp, StorageError> {
        if body.len() > self.max_blob_size {
            return Err(StorageError::TooLarge {
                size: body.len(),
                limit: self.max_blob_size,
            });
        }

        let temp = self.temp_path(id);
        tokio::fs::write(&temp, body).await?;
        // Rename preserves mtime, so stat the temp file before the swap.
        let ts = match modified(&temp).await {
            Ok(ts) => ts,
            Err(e) => {
                let _ = tokio::fs::remove_file(&temp).await;
                return Err(e);
            }
        };
        if let Err(e) = tokio::fs::rename(&temp, self.blob_path(id)).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(ts)
    }

    async fn info(&self, id: &SyncId) -> Result<Option<Timestamp>, StorageError> {
        match modified(&self.blob_path(id)).await {
            Ok(ts) => Ok(Some(ts)),
            Err(StorageError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, id: &SyncId) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.blob_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
