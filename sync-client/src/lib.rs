//! # marksync-client
//!
//! Client library for MarkSync encrypted bookmark synchronization.
//!
//! The server only ever sees ciphertext and a random identifier; this
//! crate does everything that requires the plaintext or the passphrase:
//!
//! - [`crypto`]: passphrase → key (PBKDF2-HMAC-SHA256) and the sealed
//!   envelope format (ChaCha20-Poly1305, `nonce || ciphertext+tag`)
//! - [`transport`]: the server's HTTP surface behind a trait, with a
//!   mock for tests
//! - [`engine`]: the last-write-wins upload/download/no-op decision and
//!   its orchestration
//! - [`settings`], [`bookmarks`], [`schedule`]: the collaborator seams
//!   (persisted state, the opaque bookmark tree, scheduled triggering)
//!
//! # Example
//!
//! ```ignore
//! use marksync_client::{HttpRemoteStore, JsonFileSettings, MemoryBookmarks, SyncEngine};
//!
//! let remote = HttpRemoteStore::new("http://localhost:8080")?;
//! let settings = JsonFileSettings::new("~/.config/marksync/settings.json");
//! let engine = SyncEngine::new(remote, settings, MemoryBookmarks::new());
//! let outcome = engine.sync().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bookmarks;
pub mod crypto;
pub mod engine;
pub mod schedule;
pub mod settings;
pub mod transport;

pub use bookmarks::{BookmarkNode, BookmarkProvider, MemoryBookmarks, ProviderError};
pub use crypto::{CryptoError, SyncKey, KEY_SIZE, NONCE_SIZE};
pub use engine::{decide, SyncAction, SyncEngine, SyncError, SyncOutcome};
pub use schedule::{is_due, spawn_sync_task};
pub use settings::{
    JsonFileSettings, MemorySettings, SettingsError, SettingsStore, SyncSettings, SyncStatus,
};
pub use transport::{
    HttpRemoteStore, MockRemoteStore, RemoteCall, RemoteStore, TransportError,
};
