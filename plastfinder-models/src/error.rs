//! Upstream model errors.

use std::time::Duration;
use thiserror::Error;

/// Errors from the upstream AI service.
#[derive(Debug, Error)]
pub enum ModelError {
    /// HTTP error without a recognisable error body.
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// API-level error reported by the service.
    #[error("API error: {message}")]
    Api {
        /// Error message.
        message: String,
        /// Error status code, e.g. `INVALID_ARGUMENT`.
        code: Option<String>,
    },

    /// No response headers within the request timeout.
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested retry delay.
        retry_after: Option<Duration>,
    },

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Model not found.
    #[error("Model not found: {0}")]
    NotFound(String),

    /// The response could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network error, including failures while reading the response body.
    #[error("Network error: {0}")]
    Network(String),
}

impl ModelError {
    /// Create an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            code: None,
        }
    }

    /// Create a rate limited error.
    pub fn rate_limited(retry_after: Option<Duration>) -> Self {
        Self::RateLimited { retry_after }
    }

    /// Create an HTTP error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ModelError::http(status.as_u16(), err.to_string())
        } else {
            ModelError::Network(err.to_string())
        }
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
