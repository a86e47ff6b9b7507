//! Remote store abstraction for MarkSync.
//!
//! The server's HTTP surface is reached through the [`RemoteStore`] trait,
//! so the sync engine can be tested against [`MockRemoteStore`] without a
//! network. The real implementation is [`HttpRemoteStore`].
//!
//! All methods are request/response; the trait has no connection state.

mod http;
mod mock;

pub use http::HttpRemoteStore;
pub use mock::{MockRemoteStore, RemoteCall};

use async_trait::async_trait;
use sync_types::{StatusResponse, SyncId, Timestamp};
use thiserror::Error;

/// Transport errors.
///
/// `Network` covers everything transient (connection refused, timeouts,
/// malformed responses); the remaining variants mirror the server's error
/// taxonomy so callers can tell them apart.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete (connectivity, timeout, bad response).
    #[error("network failure: {0}")]
    Network(String),

    /// No record exists for the id.
    #[error("record not found")]
    NotFound,

    /// The server rejected the id as malformed.
    #[error("invalid sync id")]
    InvalidId,

    /// The write was rejected by the per-id rate limit.
    #[error("rate limited, retry after the current window")]
    RateLimited,

    /// The body exceeded the server's size limit.
    #[error("payload too large")]
    PayloadTooLarge,

    /// Any other server-side failure.
    #[error("server error (status {status})")]
    Server {
        /// HTTP status code returned.
        status: u16,
    },
}

/// Client view of the server's blob store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Allocate a fresh sync id (`POST /sync`). No content is registered.
    async fn create(&self) -> Result<SyncId, TransportError>;

    /// Download the blob and its modification time (`GET /sync/{id}`).
    async fn get(&self, id: &SyncId) -> Result<(Vec<u8>, Timestamp), TransportError>;

    /// Upload a blob, fully replacing prior content (`PUT /sync/{id}`).
    ///
    /// Returns the server-assigned modification time; the server's clock
    /// is authoritative.
    async fn put(&self, id: &SyncId, body: &[u8]) -> Result<Timestamp, TransportError>;

    /// Probe the modification time without transferring the body
    /// (`GET /sync/{id}/info`). Absent records yield `Ok(None)`.
    async fn info(&self, id: &SyncId) -> Result<Option<Timestamp>, TransportError>;

    /// Delete the record (`DELETE /sync/{id}`). Idempotent.
    async fn delete(&self, id: &SyncId) -> Result<(), TransportError>;

    /// Server health check (`GET /status`).
    async fn status(&self) -> Result<StatusResponse, TransportError>;
}
