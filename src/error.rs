//! Error types for the cache and its surrounding layers
//!
//! The cache itself never fails; these errors come from the fetch layer
//! and the REPL built around it.

use thiserror::Error;

// == Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Input named a command that does not exist
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// A command was given without a required argument
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    /// A `Fetch` source failed to produce a value for the key
    #[error("Fetch failed for {key}: {message}")]
    Fetch { key: String, message: String },

    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering output as JSON failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;
