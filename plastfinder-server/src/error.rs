//! Server errors and the JSON error body.

use serde::{Deserialize, Serialize};

/// Message returned when the upstream search cannot be started.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to process request with AI.";

/// Message returned for non-POST requests to the search route.
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";

/// Error response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// User-facing message.
    pub error: String,
    /// Machine-readable code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create an error body without a code.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    /// Create an error body with a code.
    pub fn with_code(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
        }
    }
}

/// Server error types.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
    /// The listener could not be bound.
    #[error("Failed to bind to address: {0}")]
    Bind(String),
    /// The server stopped with an error.
    #[error("Server error: {0}")]
    Serve(String),
    /// Logging could not be initialised.
    #[error("Tracing setup failed: {0}")]
    Tracing(String),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_string(&ErrorResponse::new(UPSTREAM_FAILURE_MESSAGE)).unwrap();
        assert_eq!(body, r#"{"error":"Failed to process request with AI."}"#);

        let body =
            serde_json::to_string(&ErrorResponse::with_code("bad", "invalid_request")).unwrap();
        assert_eq!(body, r#"{"error":"bad","code":"invalid_request"}"#);
    }
}
