//! # marksync-server
//!
//! Blob store server for MarkSync encrypted bookmark synchronization.
//!
//! The server is deliberately dumb: it stores one opaque ciphertext blob
//! per sync id, tells clients when each blob last changed, and throttles
//! writes. It has no accounts, no sessions, and no ability to read what
//! it stores; possession of an unguessable id is the only access control.
//!
//! ## Architecture
//!
//! ```text
//! Device A ──┐                 ┌── Device B
//!            │   HTTP (axum)   │
//!            ├────────────────►│
//!        ┌───┴─────────────────┴───┐
//!        │     marksync-server     │
//!        │  ┌───────────────────┐  │
//!        │  │ one file per id   │  │
//!        │  │ mtime = modified  │  │
//!        │  └───────────────────┘  │
//!        └─────────────────────────┘
//! ```
//!
//! ## Surface
//!
//! - `POST /sync` — allocate a fresh id
//! - `GET/PUT/DELETE /sync/{id}` — the blob itself
//! - `GET /sync/{id}/info` — modification time without the body
//! - `GET /status` — health check

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod http;
pub mod limits;
pub mod storage;
pub mod sweep;
