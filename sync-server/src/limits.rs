//! Write rate limiting.
//!
//! One fixed window per sync id: after an accepted write, further writes
//! for that id are rejected until the window elapses. The acceptance time
//! is recorded only when a write is admitted, so rejected attempts neither
//! extend nor reset the window.
//!
//! State is a single mutex around a plain map. Write traffic is one
//! request per id per window by construction, so there is nothing to
//! shard; a periodic [`sweep`](PutLimiter::sweep) keeps the map from
//! accumulating ids that stopped syncing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use sync_types::SyncId;

/// Per-id fixed-window limiter for blob writes.
#[derive(Debug)]
pub struct PutLimiter {
    window: Duration,
    last_accepted: Mutex<HashMap<SyncId, Instant>>,
}

impl PutLimiter {
    /// Create a limiter with the given window between accepted writes.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    /// Whether a write for `id` is admitted right now.
    ///
    /// Records the acceptance on admit; a rejection has no side effects.
    pub fn check(&self, id: &SyncId) -> bool {
        self.check_at(id, Instant::now())
    }

    /// [`check`](Self::check) against an explicit clock, for tests.
    pub fn check_at(&self, id: &SyncId, now: Instant) -> bool {
        let mut map = self.last_accepted.lock().unwrap();
        if let Some(&accepted) = map.get(id) {
            if now.saturating_duration_since(accepted) < self.window {
                return false;
            }
        }
        map.insert(*id, now);
        true
    }

    /// Evict entries whose window has fully elapsed.
    ///
    /// Returns the number of evicted ids.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let mut map = self.last_accepted.lock().unwrap();
        let before = map.len();
        map.retain(|_, accepted| now.saturating_duration_since(*accepted) < self.window);
        before - map.len()
    }

    /// Number of ids currently tracked.
    pub fn tracked(&self) -> usize {
        self.last_accepted.lock().unwrap().len()
    }
}
