//! Core error types.

use thiserror::Error;

/// Errors raised by core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error from a storage backend.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::storage("disk full");
        assert_eq!(err.to_string(), "Storage error: disk full");
    }

    #[test]
    fn test_from_json_error() {
        let err: CoreError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}
