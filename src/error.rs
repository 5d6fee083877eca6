//! Error types for subsync.

use thiserror::Error;

/// Common error type for subsync.
#[derive(Error, Debug)]
pub enum SubsyncError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote resource was reachable but returned something unusable.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Validation error for input data (URLs, descriptor strings).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An operation did not complete in time.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Result type alias for subsync operations.
pub type Result<T> = std::result::Result<T, SubsyncError>;
