//! Bookmark provider seam.
//!
//! The sync engine never interprets the snapshot beyond checking that it
//! is well-formed JSON; the provider owns the actual tree. [`BookmarkNode`]
//! is a convenience shape for providers that have no native one.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// A node in a bookmark tree: either a bookmark (with a URL) or a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkNode {
    /// Display title.
    pub title: String,
    /// Target URL; folders have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Child nodes, for folders.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BookmarkNode>,
}

impl BookmarkNode {
    /// Create a leaf bookmark.
    pub fn bookmark(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            url: Some(url.to_string()),
            children: Vec::new(),
        }
    }

    /// Create a folder.
    pub fn folder(title: &str, children: Vec<BookmarkNode>) -> Self {
        Self {
            title: title.to_string(),
            url: None,
            children,
        }
    }
}

/// Provider errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider has no snapshot to offer.
    #[error("no local bookmark data")]
    Empty,

    /// Reading or writing the tree failed.
    #[error("bookmark provider failure: {0}")]
    Backend(String),
}

/// Source and sink for the opaque bookmark snapshot.
///
/// `snapshot` serializes the entire current tree; `replace` swaps the
/// entire tree for a downloaded one. There is no partial update: the
/// conflict policy is last-write-wins, full replacement.
pub trait BookmarkProvider: Send + Sync {
    /// Serialize the current tree to bytes.
    fn snapshot(&self) -> Result<Vec<u8>, ProviderError>;

    /// Replace the entire tree with the given serialized payload.
    ///
    /// Only called after the payload has been authenticated and validated;
    /// the provider may still reject it if it cannot apply it atomically.
    fn replace(&self, payload: &[u8]) -> Result<(), ProviderError>;
}

/// In-memory [`BookmarkProvider`] holding one serialized snapshot.
#[derive(Debug, Default)]
pub struct MemoryBookmarks {
    inner: Mutex<Option<Vec<u8>>>,
}

impl MemoryBookmarks {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider seeded with a serialized tree.
    pub fn with_snapshot(payload: Vec<u8>) -> Self {
        Self {
            inner: Mutex::new(Some(payload)),
        }
    }

    /// Create a provider seeded with a [`BookmarkNode`] tree.
    pub fn with_tree(root: &BookmarkNode) -> Self {
        // Serialization of an owned tree cannot fail
        let payload = serde_json::to_vec(root).expect("bookmark tree serializes");
        Self::with_snapshot(payload)
    }

    /// The current snapshot, if any.
    pub fn current(&self) -> Option<Vec<u8>> {
        self.inner.lock().unwrap().clone()
    }

    /// The current snapshot decoded as a [`BookmarkNode`] tree.
    pub fn current_tree(&self) -> Option<BookmarkNode> {
        self.current()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    }
}

impl BookmarkProvider for MemoryBookmarks {
    fn snapshot(&self) -> Result<Vec<u8>, ProviderError> {
        self.inner.lock().unwrap().clone().ok_or(ProviderError::Empty)
    }

    fn replace(&self, payload: &[u8]) -> Result<(), ProviderError> {
        *self.inner.lock().unwrap() = Some(payload.to_vec());
        Ok(())
    }
}
