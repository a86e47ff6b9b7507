//! Blob storage for the sync server.
//!
//! One opaque ciphertext blob per sync id, fully replaced on every write.
//! The blob's modification time is the only metadata the server keeps and
//! the sole source of truth for `lastModified`.

mod fs;

pub use fs::FsBlobStore;

use crate::error::StorageError;
use async_trait::async_trait;
use sync_types::{SyncId, Timestamp};

/// Trait for blob storage backends.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the blob and its modification time. `None` when absent.
    async fn get(&self, id: &SyncId) -> Result<Option<(Vec<u8>, Timestamp)>, StorageError>;

    /// Replace the blob wholesale. Returns the new modification time.
    async fn put(&self, id: &SyncId, body: &[u8]) -> Result<Timestamp, StorageError>;

    /// Modification time only, no body read. `None` when absent.
    async fn info(&self, id: &SyncId) -> Result<Option<Timestamp>, StorageError>;

    /// Remove the blob. Deleting an absent id is not an error.
    async fn delete(&self, id: &SyncId) -> Result<(), StorageError>;
}
