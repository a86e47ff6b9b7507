//! Two-device end-to-end flow against a shared in-memory remote store.
//!
//! Device A uploads its bookmark tree; device B, configured with the same
//! sync id and passphrase, downloads and reconstructs an identical tree.
//! A device with the wrong passphrase gets an authentication failure and
//! its local data stays untouched.

use marksync_client::{
    BookmarkNode, BookmarkProvider, MemoryBookmarks, MemorySettings, MockRemoteStore,
    SettingsStore, SyncEngine, SyncError, SyncOutcome, SyncSettings, SyncStatus,
};
use sync_types::{SyncId, Timestamp};

const SHARED_ID: &str = "11111111-1111-4111-8111-111111111111";
const PASSPHRASE: &str = "correct horse";

fn shared_id() -> SyncId {
    SyncId::parse(SHARED_ID).unwrap()
}

fn device(
    remote: &MockRemoteStore,
    passphrase: &str,
    bookmarks: MemoryBookmarks,
) -> SyncEngine<MockRemoteStore, MemorySettings, MemoryBookmarks> {
    let settings = SyncSettings {
        sync_id: Some(shared_id()),
        passphrase: Some(passphrase.to_string()),
        auto_sync_enabled: true,
        ..Default::default()
    };
    SyncEngine::new(remote.clone(), MemorySettings::new(settings), bookmarks)
}

#[tokio::test]
async fn two_devices_converge_on_the_same_tree() {
    let remote = MockRemoteStore::new();
    let tree = BookmarkNode::bookmark("A", "http://a");

    // Device A uploads its snapshot
    let device_a = device(&remote, PASSPHRASE, MemoryBookmarks::with_tree(&tree));
    let outcome = device_a.sync().await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Uploaded { .. }));

    // The server holds an opaque envelope, not the tree
    let (stored, _) = remote.record(&shared_id()).unwrap();
    assert!(serde_json::from_slice::<serde_json::Value>(&stored).is_err());

    // Device B starts empty and downloads
    let device_b = device(&remote, PASSPHRASE, MemoryBookmarks::new());
    let outcome = device_b.sync().await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Downloaded { .. }));

    // Identical reconstructed structure
    assert_eq!(device_b.bookmarks().current_tree().unwrap(), tree);

    // Both sides now agree; another attempt on either is a no-op
    assert_eq!(device_a.sync().await.unwrap(), SyncOutcome::UpToDate);
    assert_eq!(device_b.sync().await.unwrap(), SyncOutcome::UpToDate);
}

#[tokio::test]
async fn wrong_passphrase_fails_and_leaves_local_data_alone() {
    let remote = MockRemoteStore::new();
    let tree = BookmarkNode::bookmark("A", "http://a");

    let device_a = device(&remote, PASSPHRASE, MemoryBookmarks::with_tree(&tree));
    device_a.sync().await.unwrap();

    let local_tree = BookmarkNode::bookmark("mine", "http://mine");
    let device_b = device(
        &remote,
        "definitely not the passphrase",
        MemoryBookmarks::with_tree(&local_tree),
    );

    let err = device_b.sync().await.unwrap_err();
    assert!(matches!(err, SyncError::Authentication));

    // Local snapshot untouched, failure recorded distinctly
    assert_eq!(device_b.bookmarks().current_tree().unwrap(), local_tree);
    let saved = device_b.settings().load().unwrap();
    assert_eq!(saved.last_known_modified, None);
    assert!(matches!(
        saved.last_sync_status,
        Some(SyncStatus::Error { .. })
    ));
}

#[tokio::test]
async fn later_edit_on_one_device_overwrites_the_other() {
    let remote = MockRemoteStore::new();

    let device_a = device(
        &remote,
        PASSPHRASE,
        MemoryBookmarks::with_tree(&BookmarkNode::bookmark("v1", "http://one")),
    );
    let device_b = device(&remote, PASSPHRASE, MemoryBookmarks::new());

    device_a.sync().await.unwrap();
    device_b.sync().await.unwrap();

    // Device B edits its tree; the host's change listener bumps the
    // watermark past the server's record so the next attempt uploads.
    let v2 = BookmarkNode::folder("root", vec![BookmarkNode::bookmark("v2", "http://two")]);
    device_b
        .bookmarks()
        .replace(&serde_json::to_vec(&v2).unwrap())
        .unwrap();
    let mut settings = device_b.settings().load().unwrap();
    settings.last_known_modified = settings
        .last_known_modified
        .map(|ts| Timestamp::from_millis(ts.as_millis() + 1));
    device_b.settings().save(&settings).unwrap();

    let outcome = device_b.sync().await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Uploaded { .. }));

    // Device A sees a strictly newer record and replaces wholesale
    let outcome = device_a.sync().await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Downloaded { .. }));
    assert_eq!(device_a.bookmarks().current_tree().unwrap(), v2);
}
