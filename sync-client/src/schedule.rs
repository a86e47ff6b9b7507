//! Scheduled sync triggering.
//!
//! The host environment may suspend or restart the client between firings,
//! so due-ness is always recomputed from the persisted last-attempt
//! timestamp, never from an in-memory countdown. [`spawn_sync_task`] is a
//! convenience driver that polls [`SyncEngine::sync_if_due`] on a short
//! tick; any external scheduler calling the same entry point works too.

use crate::bookmarks::BookmarkProvider;
use crate::engine::SyncEngine;
use crate::settings::SettingsStore;
use crate::transport::RemoteStore;
use std::sync::Arc;
use std::time::Duration;
use sync_types::Timestamp;
use tokio::time::interval;

/// Whether a scheduled sync is due.
///
/// Due when there is no recorded attempt yet, or when at least
/// `interval_minutes` have elapsed since the last one. Pure function.
pub fn is_due(last_attempt: Option<Timestamp>, interval_minutes: u32, now: Timestamp) -> bool {
    match last_attempt {
        None => true,
        Some(last) => {
            let interval_millis = i64::from(interval_minutes) * 60 * 1000;
            now.millis_since(last) >= interval_millis
        }
    }
}

/// Spawn a background task that fires scheduled sync attempts.
///
/// Polls every `poll_interval` and runs an attempt whenever one is due.
/// Overlap with manual triggers is handled by the engine's single-flight
/// guard. Returns a handle that can be aborted to stop the task.
pub fn spawn_sync_task<R, S, B>(
    engine: Arc<SyncEngine<R, S, B>>,
    poll_interval: Duration,
) -> tokio::task::JoinHandle<()>
where
    R: RemoteStore + 'static,
    S: SettingsStore + 'static,
    B: BookmarkProvider + 'static,
{
    tokio::spawn(async move {
        let mut timer = interval(poll_interval);
        loop {
            timer.tick().await;
            match engine.sync_if_due().await {
                Ok(outcome) => tracing::debug!(?outcome, "scheduled sync tick"),
                Err(e) => tracing::warn!(error = %e, "scheduled sync failed"),
            }
        }
    })
}
