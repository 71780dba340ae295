//! Integration Tests for the Cached Fetch Layer
//!
//! Drives `CachedFetcher` with in-memory sources that count their calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use pokecache::{Cache, CachedFetcher, Error, Fetch, Result};
use tokio_test::{assert_err, assert_ok};

const TTL: Duration = Duration::from_millis(20);

// == Helper Sources ==

/// Returns `body:<key>` and counts how often it was asked.
#[derive(Clone, Default)]
struct CountingSource {
    calls: Arc<AtomicUsize>,
}

impl CountingSource {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetch for CountingSource {
    async fn fetch(&self, key: &str) -> Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Bytes::from(format!("body:{key}")))
    }
}

/// Fails every request.
#[derive(Clone, Default)]
struct FailingSource {
    calls: Arc<AtomicUsize>,
}

impl Fetch for FailingSource {
    async fn fetch(&self, key: &str) -> Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::Fetch {
            key: key.to_string(),
            message: "service unavailable".to_string(),
        })
    }
}

// == Tests ==

#[tokio::test(start_paused = true)]
async fn test_source_called_once_within_ttl() {
    let source = CountingSource::default();
    let fetcher = CachedFetcher::new(Cache::new(TTL), source.clone());

    let first = assert_ok!(fetcher.fetch("location-area?offset=0").await);
    let second = assert_ok!(fetcher.fetch("location-area?offset=0").await);

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.body, second.body);
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_source_called_again_after_expiry() {
    let source = CountingSource::default();
    let fetcher = CachedFetcher::new(Cache::new(TTL), source.clone());

    assert_ok!(fetcher.fetch("location-area/canalave").await);
    tokio::time::sleep(TTL * 3).await;

    let refetched = assert_ok!(fetcher.fetch("location-area/canalave").await);
    assert!(!refetched.from_cache);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let source = FailingSource::default();
    let fetcher = CachedFetcher::new(Cache::new(TTL), source.clone());

    let err = assert_err!(fetcher.fetch("pokemon/missingno").await);
    assert!(matches!(err, Error::Fetch { ref key, .. } if key == "pokemon/missingno"));
    assert_err!(fetcher.fetch("pokemon/missingno").await);

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert!(fetcher.cache().is_empty());
}

#[tokio::test]
async fn test_fetchers_can_share_a_cache() {
    let cache = Cache::new(Duration::from_secs(60));
    let source_a = CountingSource::default();
    let source_b = CountingSource::default();
    let fetcher_a = CachedFetcher::new(cache.clone(), source_a.clone());
    let fetcher_b = CachedFetcher::new(cache.clone(), source_b.clone());

    assert_ok!(fetcher_a.fetch("shared").await);
    let from_b = assert_ok!(fetcher_b.fetch("shared").await);

    assert!(from_b.from_cache);
    assert_eq!(source_a.calls(), 1);
    assert_eq!(source_b.calls(), 0);
}

#[tokio::test]
async fn test_independent_caches_are_isolated() {
    let source = CountingSource::default();
    let fetcher_a = CachedFetcher::new(Cache::new(Duration::from_secs(60)), source.clone());
    let fetcher_b = CachedFetcher::new(Cache::new(Duration::from_secs(60)), source.clone());

    assert_ok!(fetcher_a.fetch("key").await);
    let from_b = assert_ok!(fetcher_b.fetch("key").await);

    assert!(!from_b.from_cache);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_cached_body_seeded_by_add() {
    let cache = Cache::new(Duration::from_secs(60));
    cache.add("seeded", "from elsewhere");
    let source = CountingSource::default();
    let fetcher = CachedFetcher::new(cache, source.clone());

    let fetched = assert_ok!(fetcher.fetch("seeded").await);
    assert_eq!(fetched.body, Bytes::from_static(b"from elsewhere"));
    assert_eq!(source.calls(), 0);
}
