//! JSON wire bodies for the HTTP surface.
//!
//! Field names are camelCase on the wire (`lastModified`, `maxSyncSize`),
//! matching what browser-side consumers expect. Blob bodies themselves are
//! raw bytes and never pass through these types.

use crate::{SyncId, Timestamp};
use serde::{Deserialize, Serialize};

/// Response to `POST /sync`: a freshly allocated identifier.
///
/// `lastModified` is always `null` here; nothing has been written yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    /// The allocated identifier.
    pub id: SyncId,
    /// Always absent for a fresh id.
    pub last_modified: Option<Timestamp>,
}

/// Response to `PUT /sync/{id}`: the server-assigned modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutResponse {
    /// Server wall-clock time of the accepted write.
    pub last_modified: Timestamp,
}

/// Response to `GET /sync/{id}/info`: staleness probe without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    /// Modification time of the stored blob.
    pub last_modified: Timestamp,
}

/// Response to `GET /status`: health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Overall status, `"online"` when serving.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Maximum accepted blob size in bytes.
    pub max_sync_size: usize,
}
