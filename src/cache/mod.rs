//! Cache Module
//!
//! Provides an in-memory byte cache whose entries are removed by a
//! background reaper once they outlive the configured TTL.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::Cache;
pub(crate) use store::WeakCache;

// == Public Constants ==
/// Smallest TTL the cache accepts; a zero TTL is raised to this.
pub const MIN_TTL: std::time::Duration = std::time::Duration::from_millis(1);
