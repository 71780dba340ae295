//! Cache Reaper Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::WeakCache;

/// Spawns the reaper loop for a cache.
///
/// Each iteration runs one sweep and then sleeps for `ttl`, so an entry can
/// live for up to twice the TTL before it is removed. The loop ends when
/// `shutdown` is cancelled or when the last `Cache` handle is dropped.
///
/// # Arguments
/// * `cache` - Weak reference to the cache being swept
/// * `ttl` - Entry lifetime, also used as the sweep interval
/// * `shutdown` - Token that stops the loop when cancelled
pub(crate) fn spawn_reaper_task(
    cache: WeakCache,
    ttl: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache reaper with interval of {:?}", ttl);

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let Some(live) = cache.upgrade() else {
                debug!("Cache dropped, reaper exiting");
                break;
            };
            let removed = live.reap_expired();
            let remaining = live.len();
            drop(live);

            if removed > 0 {
                info!(removed, remaining, "Reaper removed expired entries");
            } else {
                debug!(remaining, "Reaper found no expired entries");
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(ttl) => {}
            }
        }

        info!("Cache reaper stopped");
    })
}
