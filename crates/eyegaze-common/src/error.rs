//! Common error types for eyegaze.

use thiserror::Error;

/// Result type alias using eyegaze's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for configuration and tooling.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (config file, socket, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a config error from any displayable type.
    pub fn config(msg: impl std::fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }
}
