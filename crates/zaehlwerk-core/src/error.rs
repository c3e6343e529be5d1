//! Error types for the zaehlwerk-core library.
//!
//! The extraction engine itself never fails: a field that cannot be located
//! with confidence is simply absent from the result. Errors here cover the
//! surrounding concerns only (configuration files, serialization).

use thiserror::Error;

/// Main error type for the zaehlwerk library.
#[derive(Error, Debug)]
pub enum ZaehlwerkError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the zaehlwerk library.
pub type Result<T> = std::result::Result<T, ZaehlwerkError>;
