//! Last-write-wins sync engine.
//!
//! One sync attempt walks `Idle → CheckingRemote → {Uploading | Downloading
//! | UpToDate} → Idle`; any failure drops straight back to Idle with a
//! surfaced error. The branch decision itself is the pure [`decide`]
//! function, so the whole conflict policy is unit-testable without I/O;
//! [`SyncEngine`] interprets the decision against the remote store,
//! the cipher, and the local collaborators.
//!
//! There is deliberately no merge: whichever side is newer replaces the
//! other wholesale.

use crate::bookmarks::{BookmarkProvider, ProviderError};
use crate::crypto::{CryptoError, SyncKey};
use crate::settings::{SettingsError, SettingsStore, SyncSettings, SyncStatus};
use crate::transport::{RemoteStore, TransportError};
use sync_types::{SyncId, Timestamp};
use thiserror::Error;

/// What a sync attempt should do, given both sides' modification times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Local state wins; replace the server's record.
    Upload,
    /// Server record wins; replace the local snapshot.
    Download,
    /// Both sides agree; no transfer.
    UpToDate,
}

/// Decide the sync direction by last-write-wins.
///
/// `local` is the client's cached `last_known_modified`; `remote` is the
/// server's reported `lastModified` (absent when no record exists).
/// Pure function, no I/O.
pub fn decide(local: Option<Timestamp>, remote: Option<Timestamp>) -> SyncAction {
    match (local, remote) {
        // Server empty: whatever we have locally is the newest state.
        (_, None) => SyncAction::Upload,
        // Never synced but the server has a record: take it.
        (None, Some(_)) => SyncAction::Download,
        (Some(local), Some(remote)) => {
            if remote > local {
                SyncAction::Download
            } else if remote < local {
                SyncAction::Upload
            } else {
                SyncAction::UpToDate
            }
        }
    }
}

/// Result of one sync attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local snapshot was sealed and uploaded.
    Uploaded {
        /// Server-assigned modification time of the new record.
        last_modified: Timestamp,
    },
    /// Server record was downloaded and applied locally.
    Downloaded {
        /// Server modification time the client is now synced to.
        last_modified: Timestamp,
    },
    /// Both sides already agreed; nothing was transferred.
    UpToDate,
    /// Sync id, passphrase, or enablement missing. Silent no-op.
    NotConfigured,
    /// A scheduled trigger fired before the interval elapsed.
    NotDue,
    /// Another sync attempt is already in flight; this trigger is ignored.
    AlreadyRunning,
}

/// Sync attempt errors.
///
/// `Network` and `RateLimited` are transient and left to the next trigger.
/// `Authentication` and `MalformedPayload` mean the downloaded record can
/// never be applied with the current passphrase; they abort with zero
/// local mutation and must stay distinguishable from network failures.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The server could not be reached or answered unintelligibly.
    #[error("network failure: {0}")]
    Network(String),

    /// The server's write window for this id is still open.
    #[error("rate limited by server")]
    RateLimited,

    /// The envelope did not authenticate (wrong passphrase or corruption).
    #[error("authentication failed: wrong passphrase or corrupted data")]
    Authentication,

    /// The decrypted payload is not a well-formed snapshot.
    #[error("downloaded payload is malformed")]
    MalformedPayload,

    /// The server rejected the request outright.
    #[error("server rejected request: {0}")]
    Rejected(TransportError),

    /// Local settings could not be read or written.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The bookmark provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Sealing the snapshot failed.
    #[error("encryption failed: {0}")]
    Seal(String),
}

impl From<TransportError> for SyncError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Network(msg) => Self::Network(msg),
            TransportError::RateLimited => Self::RateLimited,
            other => Self::Rejected(other),
        }
    }
}

impl From<CryptoError> for SyncError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::AuthenticationFailed => Self::Authentication,
            CryptoError::EncryptionFailed(msg) => Self::Seal(msg),
        }
    }
}

/// Orchestrates sync attempts over the remote store and local collaborators.
///
/// Single-flight: overlapping triggers (manual or scheduled) are ignored
/// while an attempt is running; an attempt always runs to completion.
pub struct SyncEngine<R, S, B> {
    remote: R,
    settings: S,
    bookmarks: B,
    in_flight: tokio::sync::Mutex<()>,
}

impl<R, S, B> SyncEngine<R, S, B>
where
    R: RemoteStore,
    S: SettingsStore,
    B: BookmarkProvider,
{
    /// Create an engine over the given collaborators.
    pub fn new(remote: R, settings: S, bookmarks: B) -> Self {
        Self {
            remote,
            settings,
            bookmarks,
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Access the remote store (for id allocation and health checks).
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Access the settings store.
    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// Access the bookmark provider.
    pub fn bookmarks(&self) -> &B {
        &self.bookmarks
    }

    /// Run one sync attempt (manual trigger).
    ///
    /// Returns `Ok(SyncOutcome::NotConfigured)` without touching anything
    /// when sync id, passphrase, or enablement is missing, and
    /// `Ok(SyncOutcome::AlreadyRunning)` when an attempt is in flight.
    pub async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("sync trigger ignored: attempt already in flight");
            return Ok(SyncOutcome::AlreadyRunning);
        };

        let mut settings = self.settings.load()?;
        if !settings.is_configured() {
            tracing::debug!("sync skipped: not configured");
            return Ok(SyncOutcome::NotConfigured);
        }

        settings.last_attempt_at = Some(Timestamp::now());
        let result = self.attempt(&mut settings).await;

        // Status tag and timestamps are persisted on every branch,
        // success or failure.
        settings.last_sync_status = Some(match &result {
            Ok(_) => SyncStatus::Success,
            Err(e) => SyncStatus::Error {
                message: e.to_string(),
            },
        });
        self.settings.save(&settings)?;

        match &result {
            Ok(outcome) => tracing::info!(?outcome, "sync attempt finished"),
            Err(e) => tracing::warn!(error = %e, "sync attempt failed"),
        }
        result
    }

    /// Run a scheduled sync attempt if the configured interval has elapsed
    /// since the persisted last attempt.
    pub async fn sync_if_due(&self) -> Result<SyncOutcome, SyncError> {
        let settings = self.settings.load()?;
        if !settings.is_configured() {
            return Ok(SyncOutcome::NotConfigured);
        }
        if !crate::schedule::is_due(
            settings.last_attempt_at,
            settings.interval_minutes,
            Timestamp::now(),
        ) {
            return Ok(SyncOutcome::NotDue);
        }
        self.sync().await
    }

    /// The body of one attempt. Mutates `last_known_modified` only on a
    /// successful upload or download.
    async fn attempt(&self, settings: &mut SyncSettings) -> Result<SyncOutcome, SyncError> {
        // is_configured() was checked by the caller
        let sync_id: SyncId = settings.sync_id.ok_or_else(|| {
            SyncError::Network("sync id disappeared mid-attempt".into())
        })?;
        let passphrase = settings
            .passphrase
            .clone()
            .ok_or_else(|| SyncError::Network("passphrase disappeared mid-attempt".into()))?;
        let key = SyncKey::from_passphrase(&passphrase);

        // CheckingRemote: lightweight staleness probe, no body transfer.
        let remote_ts = self.remote.info(&sync_id).await?;

        match decide(settings.last_known_modified, remote_ts) {
            SyncAction::Upload => {
                let snapshot = self.bookmarks.snapshot()?;
                let envelope = key.seal(&snapshot)?;
                let last_modified = self.remote.put(&sync_id, &envelope).await?;
                // The server's clock is authoritative, never ours.
                settings.last_known_modified = Some(last_modified);
                Ok(SyncOutcome::Uploaded { last_modified })
            }
            SyncAction::Download => {
                // decide() only picks Download when the server has a record
                let server_ts = remote_ts.ok_or_else(|| {
                    SyncError::Network("record disappeared between probe and download".into())
                })?;
                let (envelope, _header_ts) = self.remote.get(&sync_id).await?;

                // Authenticate and validate the full payload before any
                // local mutation; a failure here leaves local data intact.
                let plaintext = key.open(&envelope)?;
                serde_json::from_slice::<serde_json::Value>(&plaintext)
                    .map_err(|_| SyncError::MalformedPayload)?;

                self.bookmarks.replace(&plaintext)?;
                settings.last_known_modified = Some(server_ts);
                Ok(SyncOutcome::Downloaded {
                    last_modified: server_ts,
                })
            }
            SyncAction::UpToDate => Ok(SyncOutcome::UpToDate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::MemoryBookmarks;
    use crate::settings::MemorySettings;
    use crate::transport::{MockRemoteStore, RemoteCall};

    // ===========================================
    // decide() — pure LWW policy
    // ===========================================

    #[test]
    fn decide_uploads_when_server_empty() {
        assert_eq!(decide(None, None), SyncAction::Upload);
        assert_eq!(
            decide(Some(Timestamp::from_millis(100)), None),
            SyncAction::Upload
        );
    }

    #[test]
    fn decide_downloads_when_never_synced_and_server_has_record() {
        assert_eq!(
            decide(None, Some(Timestamp::from_millis(100))),
            SyncAction::Download
        );
    }

    #[test]
    fn decide_downloads_when_server_strictly_newer() {
        assert_eq!(
            decide(
                Some(Timestamp::from_millis(100)),
                Some(Timestamp::from_millis(101))
            ),
            SyncAction::Download
        );
    }

    #[test]
    fn decide_uploads_when_local_newer() {
        assert_eq!(
            decide(
                Some(Timestamp::from_millis(101)),
                Some(Timestamp::from_millis(100))
            ),
            SyncAction::Upload
        );
    }

    #[test]
    fn decide_noop_when_equal() {
        let ts = Timestamp::from_millis(100);
        assert_eq!(decide(Some(ts), Some(ts)), SyncAction::UpToDate);
    }

    // ===========================================
    // Engine Fixtures
    // ===========================================

    fn configured_settings(id: SyncId) -> SyncSettings {
        SyncSettings {
            sync_id: Some(id),
            passphrase: Some("correct horse".into()),
            auto_sync_enabled: true,
            ..Default::default()
        }
    }

    fn engine_with(
        remote: MockRemoteStore,
        settings: SyncSettings,
        bookmarks: MemoryBookmarks,
    ) -> SyncEngine<MockRemoteStore, MemorySettings, MemoryBookmarks> {
        SyncEngine::new(remote, MemorySettings::new(settings), bookmarks)
    }

    fn tree_bytes() -> Vec<u8> {
        b"{\"title\":\"toolbar\",\"children\":[{\"title\":\"A\",\"url\":\"http://a\"}]}".to_vec()
    }

    // ===========================================
    // NotConfigured Short-Circuit
    // ===========================================

    #[tokio::test]
    async fn missing_sync_id_is_silent_noop() {
        let remote = MockRemoteStore::new();
        let settings = SyncSettings {
            passphrase: Some("p".into()),
            auto_sync_enabled: true,
            ..Default::default()
        };
        let engine = engine_with(remote.clone(), settings, MemoryBookmarks::new());

        let outcome = engine.sync().await.unwrap();

        assert_eq!(outcome, SyncOutcome::NotConfigured);
        assert!(remote.calls().is_empty());
        // Silent: no status recorded either
        assert_eq!(engine.settings().load().unwrap().last_sync_status, None);
    }

    #[tokio::test]
    async fn disabled_sync_is_silent_noop() {
        let remote = MockRemoteStore::new();
        let mut settings = configured_settings(SyncId::generate());
        settings.auto_sync_enabled = false;
        let engine = engine_with(remote.clone(), settings, MemoryBookmarks::new());

        assert_eq!(engine.sync().await.unwrap(), SyncOutcome::NotConfigured);
        assert!(remote.calls().is_empty());
    }

    // ===========================================
    // Upload Branch
    // ===========================================

    #[tokio::test]
    async fn absent_server_record_uploads_sealed_snapshot() {
        let id = SyncId::generate();
        let remote = MockRemoteStore::new();
        let engine = engine_with(
            remote.clone(),
            configured_settings(id),
            MemoryBookmarks::with_snapshot(tree_bytes()),
        );

        let outcome = engine.sync().await.unwrap();

        let SyncOutcome::Uploaded { last_modified } = outcome else {
            panic!("expected upload, got {:?}", outcome);
        };
        // Exactly one probe and one write
        assert_eq!(
            remote.calls(),
            vec![RemoteCall::Info(id), RemoteCall::Put(id)]
        );
        // Stored record is the sealed snapshot, recoverable with the key
        let (envelope, server_ts) = remote.record(&id).unwrap();
        assert_eq!(server_ts, last_modified);
        let key = SyncKey::from_passphrase("correct horse");
        assert_eq!(key.open(&envelope).unwrap(), tree_bytes());
        // Server clock became our cached watermark; status recorded
        let saved = engine.settings().load().unwrap();
        assert_eq!(saved.last_known_modified, Some(last_modified));
        assert_eq!(saved.last_sync_status, Some(SyncStatus::Success));
        assert!(saved.last_attempt_at.is_some());
    }

    #[tokio::test]
    async fn local_newer_than_server_uploads() {
        let id = SyncId::generate();
        let remote = MockRemoteStore::new();
        remote.insert_record(id, b"stale".to_vec(), Timestamp::from_millis(1_000));

        let mut settings = configured_settings(id);
        settings.last_known_modified = Some(Timestamp::from_millis(2_000));
        let engine = engine_with(
            remote.clone(),
            settings,
            MemoryBookmarks::with_snapshot(tree_bytes()),
        );

        let outcome = engine.sync().await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Uploaded { .. }));
        assert_eq!(
            remote.calls(),
            vec![RemoteCall::Info(id), RemoteCall::Put(id)]
        );
    }

    // ===========================================
    // Download Branch
    // ===========================================

    #[tokio::test]
    async fn server_newer_downloads_and_fully_replaces_local() {
        let id = SyncId::generate();
        let server_ts = Timestamp::from_millis(5_000);
        let key = SyncKey::from_passphrase("correct horse");
        let remote = MockRemoteStore::new();
        remote.insert_record(id, key.seal(&tree_bytes()).unwrap(), server_ts);

        let mut settings = configured_settings(id);
        settings.last_known_modified = Some(Timestamp::from_millis(1_000));
        let bookmarks = MemoryBookmarks::with_snapshot(b"{\"title\":\"local\"}".to_vec());
        let engine = engine_with(remote.clone(), settings, bookmarks);

        let outcome = engine.sync().await.unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Downloaded {
                last_modified: server_ts
            }
        );
        // Exactly one probe and one read, no writes
        assert_eq!(
            remote.calls(),
            vec![RemoteCall::Info(id), RemoteCall::Get(id)]
        );
        // Local snapshot replaced wholesale, never merged
        assert_eq!(engine.bookmarks().current().unwrap(), tree_bytes());
        let saved = engine.settings().load().unwrap();
        assert_eq!(saved.last_known_modified, Some(server_ts));
        assert_eq!(saved.last_sync_status, Some(SyncStatus::Success));
    }

    #[tokio::test]
    async fn first_sync_on_new_device_downloads() {
        let id = SyncId::generate();
        let key = SyncKey::from_passphrase("correct horse");
        let remote = MockRemoteStore::new();
        remote.insert_record(
            id,
            key.seal(&tree_bytes()).unwrap(),
            Timestamp::from_millis(42),
        );

        let engine = engine_with(remote, configured_settings(id), MemoryBookmarks::new());

        assert!(matches!(
            engine.sync().await.unwrap(),
            SyncOutcome::Downloaded { .. }
        ));
        assert_eq!(engine.bookmarks().current().unwrap(), tree_bytes());
    }

    // ===========================================
    // No-op Branch
    // ===========================================

    #[tokio::test]
    async fn equal_timestamps_issue_only_the_info_probe() {
        let id = SyncId::generate();
        let ts = Timestamp::from_millis(7_000);
        let remote = MockRemoteStore::new();
        remote.insert_record(id, b"whatever".to_vec(), ts);

        let mut settings = configured_settings(id);
        settings.last_known_modified = Some(ts);
        let engine = engine_with(remote.clone(), settings, MemoryBookmarks::new());

        assert_eq!(engine.sync().await.unwrap(), SyncOutcome::UpToDate);
        assert_eq!(remote.calls(), vec![RemoteCall::Info(id)]);
    }

    // ===========================================
    // Failure Handling
    // ===========================================

    #[tokio::test]
    async fn wrong_passphrase_aborts_without_local_mutation() {
        let id = SyncId::generate();
        let other_key = SyncKey::from_passphrase("wrong words");
        let remote = MockRemoteStore::new();
        remote.insert_record(
            id,
            other_key.seal(&tree_bytes()).unwrap(),
            Timestamp::from_millis(9_000),
        );

        let local = b"{\"title\":\"untouched\"}".to_vec();
        let engine = engine_with(
            remote,
            configured_settings(id),
            MemoryBookmarks::with_snapshot(local.clone()),
        );

        let err = engine.sync().await.unwrap_err();
        assert!(matches!(err, SyncError::Authentication));
        // Local data and watermark untouched
        assert_eq!(engine.bookmarks().current().unwrap(), local);
        let saved = engine.settings().load().unwrap();
        assert_eq!(saved.last_known_modified, None);
        // But the failure is recorded, distinguishable from a network error
        let Some(SyncStatus::Error { message }) = saved.last_sync_status else {
            panic!("expected error status");
        };
        assert!(message.contains("authentication"));
    }

    #[tokio::test]
    async fn malformed_decrypted_payload_aborts_without_local_mutation() {
        let id = SyncId::generate();
        let key = SyncKey::from_passphrase("correct horse");
        let remote = MockRemoteStore::new();
        // Authenticates fine but is not JSON
        remote.insert_record(
            id,
            key.seal(b"\xff\xfe not a snapshot").unwrap(),
            Timestamp::from_millis(9_000),
        );

        let local = b"{\"title\":\"untouched\"}".to_vec();
        let engine = engine_with(
            remote,
            configured_settings(id),
            MemoryBookmarks::with_snapshot(local.clone()),
        );

        let err = engine.sync().await.unwrap_err();
        assert!(matches!(err, SyncError::MalformedPayload));
        assert_eq!(engine.bookmarks().current().unwrap(), local);
        assert_eq!(engine.settings().load().unwrap().last_known_modified, None);
    }

    #[tokio::test]
    async fn network_failure_on_probe_is_transient_and_mutates_nothing() {
        let id = SyncId::generate();
        let remote = MockRemoteStore::new();
        remote.fail_next_with_network_error();

        let mut settings = configured_settings(id);
        settings.last_known_modified = Some(Timestamp::from_millis(500));
        let engine = engine_with(
            remote,
            settings,
            MemoryBookmarks::with_snapshot(tree_bytes()),
        );

        let err = engine.sync().await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
        let saved = engine.settings().load().unwrap();
        assert_eq!(
            saved.last_known_modified,
            Some(Timestamp::from_millis(500))
        );
        assert!(matches!(
            saved.last_sync_status,
            Some(SyncStatus::Error { .. })
        ));
    }

    #[tokio::test]
    async fn rate_limited_put_leaves_watermark_unchanged() {
        let id = SyncId::generate();
        let remote = MockRemoteStore::new();
        remote.fail_next_put_with_rate_limit();
        let engine = engine_with(
            remote.clone(),
            configured_settings(id),
            MemoryBookmarks::with_snapshot(tree_bytes()),
        );

        // The probe succeeds (server empty), the write is rejected
        let err = engine.sync().await.unwrap_err();
        assert!(matches!(err, SyncError::RateLimited));
        assert_eq!(
            remote.calls(),
            vec![RemoteCall::Info(id), RemoteCall::Put(id)]
        );
        assert_eq!(engine.settings().load().unwrap().last_known_modified, None);
        assert!(matches!(
            engine.settings().load().unwrap().last_sync_status,
            Some(SyncStatus::Error { .. })
        ));
    }

    // ===========================================
    // Single Flight
    // ===========================================

    #[tokio::test]
    async fn overlapping_trigger_is_ignored() {
        let engine = engine_with(
            MockRemoteStore::new(),
            configured_settings(SyncId::generate()),
            MemoryBookmarks::with_snapshot(tree_bytes()),
        );

        // Simulate an in-flight attempt by holding the guard
        let _guard = engine.in_flight.try_lock().unwrap();
        assert_eq!(engine.sync().await.unwrap(), SyncOutcome::AlreadyRunning);
    }
}
