//! Error types for shape estimations.

use thiserror::Error;

/// Errors produced by the codec, classifier, and estimation engine.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A key string does not decompose into the expected fields.
    #[error("malformed key: {0}")]
    Format(String),

    /// A histogram expected to exist in the store is missing. The classifier
    /// and the engine must stay in lock-step, so this is never recoverable.
    #[error("histogram not found: {0}")]
    KeyNotFound(String),

    /// An unrecognized configuration value (e.g. era label).
    #[error("configuration error: {0}")]
    Config(String),

    /// Histogram algebra on incompatible binnings.
    #[error("histogram error: {0}")]
    Histogram(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
