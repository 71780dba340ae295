//! Configuration Module
//!
//! Handles loading runtime configuration from environment variables.

use std::env;
use std::time::Duration;

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in milliseconds
    pub ttl_ms: u64,
    /// Prompt printed before each REPL line
    pub prompt: String,
}

const DEFAULT_TTL_MS: u64 = 5_000;
const DEFAULT_PROMPT: &str = "Pokecache > ";

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Cache TTL in milliseconds (default: 5000)
    /// - `REPL_PROMPT` - REPL prompt (default: "Pokecache > ")
    pub fn from_env() -> Self {
        Self {
            ttl_ms: env::var("CACHE_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_MS),
            prompt: env::var("REPL_PROMPT").unwrap_or_else(|_| DEFAULT_PROMPT.to_string()),
        }
    }

    /// Returns the cache TTL as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}
