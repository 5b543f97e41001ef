//! Error types for the interval_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for interval_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plan failed validation and was not persisted
    #[error("Validation error: {0}")]
    Validation(String),

    /// A plan or item id did not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// Playback command not allowed in the current state
    #[error("Cannot apply {event} while {state}")]
    InvalidTransition { state: String, event: String },

    /// Plan storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Tone playback failed
    #[error("Audio unavailable: {0}")]
    Audio(String),
}
