//! Streaming errors.
//!
//! Only transport-level failures are represented here. Problems with a single
//! line never become a `StreamError`; see [`crate::classify::LineOutcome`].

use std::time::Duration;
use thiserror::Error;

/// Errors that end a stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The transport failed (request rejected, non-success status, no body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// No data arrived within the inactivity window.
    #[error("No data received for {0:?}")]
    Timeout(Duration),

    /// JSON encoding error while writing a line.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The stream was cancelled by its owner.
    #[error("Stream cancelled")]
    Cancelled,
}

impl StreamError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Whether the stream ended because its owner asked it to.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
