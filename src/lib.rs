//! Pokecache - An in-memory response cache with time-based expiration
//!
//! Entries are removed by a background reaper once they outlive the TTL.
//! A cached fetch layer and an interactive shell are built on top.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod repl;
mod tasks;

pub use cache::Cache;
pub use config::Config;
pub use error::{Error, Result};
pub use fetch::{CachedFetcher, Fetch, FileSource};
