//! Cache Store Module
//!
//! The expiring cache: a mutex-guarded HashMap shared between callers and a
//! background reaper that removes entries older than the configured TTL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, MIN_TTL};
use crate::tasks::spawn_reaper_task;

// == Store ==
/// Everything behind the guard.
#[derive(Debug, Default)]
struct Store {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

#[derive(Debug)]
struct Shared {
    store: Mutex<Store>,
    ttl: Duration,
    shutdown: CancellationToken,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// == Cache ==
/// Time-expiring key-value cache.
///
/// `Cache` is a handle: clones share the same entries and the same reaper.
/// `add` and `get` are synchronous and only ever hold the lock for a single
/// map operation. Expiration is performed exclusively by the reaper, so a
/// `get` may return an entry that is past its TTL but not yet swept.
#[derive(Debug, Clone)]
pub struct Cache {
    shared: Arc<Shared>,
}

/// Non-owning reference held by the reaper so it never keeps the cache alive.
#[derive(Debug, Clone)]
pub(crate) struct WeakCache {
    shared: Weak<Shared>,
}

impl WeakCache {
    pub(crate) fn upgrade(&self) -> Option<Cache> {
        self.shared.upgrade().map(|shared| Cache { shared })
    }
}

impl Cache {
    // == Constructor ==
    /// Creates an empty cache and starts its reaper.
    ///
    /// The reaper's first pass runs asynchronously; subsequent passes are
    /// `ttl` apart.
    ///
    /// # Arguments
    /// * `ttl` - How long an entry stays live after insertion
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime, since the reaper is started
    /// with `tokio::spawn`.
    pub fn new(ttl: Duration) -> Self {
        let ttl = if ttl.is_zero() {
            warn!("Zero TTL requested, using {:?} instead", MIN_TTL);
            MIN_TTL
        } else {
            ttl
        };

        let cache = Self {
            shared: Arc::new(Shared {
                store: Mutex::new(Store::default()),
                ttl,
                shutdown: CancellationToken::new(),
                reaper: Mutex::new(None),
            }),
        };

        let handle = spawn_reaper_task(cache.downgrade(), ttl, cache.shared.shutdown.clone());
        *lock(&cache.shared.reaper) = Some(handle);

        cache
    }

    // == Add ==
    /// Stores `value` under `key`, replacing any previous entry and
    /// resetting its insertion time.
    pub fn add(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        let entry = CacheEntry::new(value.into());
        let mut store = self.lock();
        store.entries.insert(key.into(), entry);
    }

    // == Get ==
    /// Returns the stored value for `key`, if present.
    ///
    /// No expiry check is made here: an entry older than the TTL is still
    /// returned until the reaper removes it.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let mut store = self.lock();
        let value = store.entries.get(key).map(|entry| entry.value.clone());
        match value {
            Some(_) => store.stats.record_hit(),
            None => store.stats.record_miss(),
        }
        value
    }

    // == Reap Expired ==
    /// Runs one reaper pass and returns the number of entries removed.
    ///
    /// Expired keys are collected under the lock, then each one is removed
    /// under its own short lock after re-checking its age, so a key that was
    /// overwritten in between survives.
    pub fn reap_expired(&self) -> usize {
        let ttl = self.shared.ttl;
        let now = Instant::now();

        let expired: Vec<String> = {
            let store = self.lock();
            store
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(ttl, now))
                .map(|(key, _)| key.clone())
                .collect()
        };

        let mut removed = 0;
        for key in expired {
            let mut store = self.lock();
            let still_expired = store
                .entries
                .get(&key)
                .is_some_and(|entry| entry.is_expired(ttl, now));
            if still_expired {
                store.entries.remove(&key);
                store.stats.record_expirations(1);
                removed += 1;
            } else {
                debug!(key = %key, "Entry refreshed during sweep, keeping it");
            }
        }

        removed
    }

    // == Shutdown ==
    /// Stops the reaper and waits for it to finish.
    ///
    /// Calling this more than once is harmless. The cache keeps serving
    /// `add` and `get` afterwards; entries just stop expiring.
    pub async fn shutdown(&self) {
        self.shared.shutdown.cancel();

        let handle = lock(&self.shared.reaper).take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!("Reaper task ended abnormally: {}", err);
            }
        }
    }

    /// Returns true while the reaper loop is active.
    pub fn is_reaper_running(&self) -> bool {
        !self.shared.shutdown.is_cancelled()
            && lock(&self.shared.reaper)
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    // == Accessors ==
    /// Returns the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    /// Returns the current number of entries, including stale ones.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let store = self.lock();
        let mut stats = store.stats.clone();
        stats.set_total_entries(store.entries.len());
        stats
    }

    pub(crate) fn downgrade(&self) -> WeakCache {
        WeakCache {
            shared: Arc::downgrade(&self.shared),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        lock(&self.shared.store)
    }
}

// A panic elsewhere can't leave the map half-written: every critical
// section is a single insert, lookup or remove.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
