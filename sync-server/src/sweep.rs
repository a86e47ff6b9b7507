//! Background sweep task for the write limiter.
//!
//! Runs periodically to evict limiter entries whose window has elapsed,
//! bounding memory over the server's lifetime.

use crate::config::SweepConfig;
use crate::limits::PutLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Spawn a background sweep task.
///
/// Returns a handle that can be used to abort the task.
pub fn spawn_sweep_task(limiter: Arc<PutLimiter>, config: SweepConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !config.enabled {
            tracing::info!("limiter sweep task disabled");
            return;
        }

        tracing::info!(interval_secs = config.interval_secs, "limiter sweep task started");
        let mut timer = interval(Duration::from_secs(config.interval_secs));

        loop {
            timer.tick().await;

            let evicted = limiter.sweep();
            if evicted > 0 {
                tracing::debug!(evicted, tracked = limiter.tracked(), "limiter sweep");
            }
        }
    })
}
