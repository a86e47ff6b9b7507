//! # marksync-types
//!
//! Shared wire and domain types for MarkSync.
//!
//! This crate defines the vocabulary both sides of the protocol speak:
//! - [`SyncId`]: the unguessable bearer identifier naming one record
//! - [`Timestamp`]: a totally ordered scalar, formatted only at the wire
//! - Wire DTOs for the JSON bodies of the HTTP surface
//!
//! It deliberately contains no I/O and no crypto; those live in
//! `marksync-client` and `marksync-server`.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod ids;
mod time;
mod wire;

pub use ids::{ParseSyncIdError, SyncId};
pub use time::{ParseTimestampError, Timestamp};
pub use wire::{CreateResponse, InfoResponse, PutResponse, StatusResponse};

/// Maximum accepted blob size in bytes (2 MiB).
///
/// Enforced by the server on every PUT and advertised via `GET /status`.
pub const MAX_SYNC_SIZE: usize = 2 * 1024 * 1024;
