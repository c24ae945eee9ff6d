//! Client errors.

use plastfinder_core::CoreError;
use plastfinder_streaming::StreamError;
use thiserror::Error;

/// Errors from the client and CLI.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The search stream failed.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Reading or writing the search history failed.
    #[error("History error: {0}")]
    History(#[from] CoreError),

    /// Invalid configuration or arguments.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
