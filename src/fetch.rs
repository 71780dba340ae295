//! Cached Fetch Layer
//!
//! Puts a [`Cache`] in front of any source that can produce bytes for a key.
//! The cache is handed in by the caller, so independent fetchers can share
//! one cache or keep their own.

use std::future::Future;
use std::path::PathBuf;

use bytes::Bytes;
use tracing::debug;

use crate::cache::Cache;
use crate::error::{Error, Result};

// == Fetch Trait ==
/// A source of raw response bodies, looked up by key.
pub trait Fetch: Send + Sync {
    /// Produces the body for `key`, or an error if it can't be obtained.
    fn fetch(&self, key: &str) -> impl Future<Output = Result<Bytes>> + Send;
}

// == Fetched ==
/// A body returned by [`CachedFetcher::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    /// The response body
    pub body: Bytes,
    /// Whether the body came from the cache rather than the source
    pub from_cache: bool,
}

// == Cached Fetcher ==
/// Consults the cache before asking the source, and remembers what the
/// source returns.
#[derive(Debug, Clone)]
pub struct CachedFetcher<F> {
    cache: Cache,
    source: F,
}

impl<F: Fetch> CachedFetcher<F> {
    /// Creates a fetcher that reads through `cache` to `source`.
    pub fn new(cache: Cache, source: F) -> Self {
        Self { cache, source }
    }

    /// Returns the cache this fetcher reads through.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Returns the body for `key`, from the cache when present.
    ///
    /// Source failures are returned as-is and nothing is cached for them.
    pub async fn fetch(&self, key: &str) -> Result<Fetched> {
        if let Some(body) = self.cache.get(key) {
            debug!(key, "Cache hit");
            return Ok(Fetched {
                body,
                from_cache: true,
            });
        }

        debug!(key, "Cache miss, fetching from source");
        let body = self.source.fetch(key).await?;
        self.cache.add(key, body.clone());

        Ok(Fetched {
            body,
            from_cache: false,
        })
    }
}

// == File Source ==
/// Reads bodies from files under a root directory; the key is the path.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Creates a source resolving keys relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Fetch for FileSource {
    async fn fetch(&self, key: &str) -> Result<Bytes> {
        let contents = tokio::fs::read(self.root.join(key))
            .await
            .map_err(|err| Error::Fetch {
                key: key.to_string(),
                message: err.to_string(),
            })?;
        Ok(Bytes::from(contents))
    }
}
