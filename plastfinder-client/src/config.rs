//! Client configuration.

use plastfinder_streaming::DEFAULT_IDLE_TIMEOUT;
use std::path::PathBuf;
use std::time::Duration;

/// Default search endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/search";

/// Client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Search endpoint URL.
    pub endpoint: String,
    /// Inactivity window for the response body.
    pub idle_timeout: Duration,
    /// Where the search history is kept.
    pub history_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            history_path: default_history_path(),
        }
    }
}

impl ClientConfig {
    /// Set the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the inactivity window.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the history file.
    #[must_use]
    pub fn with_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = path.into();
        self
    }
}

/// `<data dir>/plastfinder/history.json`, or the working directory when the
/// platform has no data directory.
pub fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plastfinder")
        .join("history.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:3000/api/search");
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert!(config.history_path.ends_with("plastfinder/history.json"));
    }
}
