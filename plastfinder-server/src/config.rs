//! Server configuration.

use crate::error::{ServerError, ServerResult};
use plastfinder_models::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use plastfinder_streaming::DEFAULT_IDLE_TIMEOUT;
use std::net::SocketAddr;
use std::time::Duration;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Server settings, normally read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (`PLASTFINDER_BIND`).
    pub bind_addr: SocketAddr,
    /// Upstream API key (`GEMINI_API_KEY`, then `API_KEY`).
    pub api_key: String,
    /// Upstream model (`PLASTFINDER_MODEL`).
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Thinking budget; zero disables thinking.
    pub thinking_budget: u64,
    /// Upstream endpoint (`PLASTFINDER_GEMINI_BASE_URL`).
    pub base_url: String,
    /// Upstream inactivity window (`PLASTFINDER_IDLE_TIMEOUT_SECS`).
    pub idle_timeout: Duration,
}

impl ServerConfig {
    /// Defaults with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.5,
            thinking_budget: 0,
            base_url: DEFAULT_BASE_URL.to_string(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Load from process environment variables.
    pub fn from_env() -> ServerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY")
            .or_else(|| get("API_KEY"))
            .ok_or_else(|| ServerError::config("GEMINI_API_KEY (or API_KEY) is not set"))?;

        let mut config = Self::new(api_key);

        if let Some(bind) = get("PLASTFINDER_BIND") {
            config.bind_addr = bind.parse().map_err(|e| {
                ServerError::config(format!("invalid PLASTFINDER_BIND {bind:?}: {e}"))
            })?;
        }
        if let Some(model) = get("PLASTFINDER_MODEL") {
            config.model = model;
        }
        if let Some(base_url) = get("PLASTFINDER_GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(secs) = get("PLASTFINDER_IDLE_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                ServerError::config(format!("invalid PLASTFINDER_IDLE_TIMEOUT_SECS {secs:?}: {e}"))
            })?;
            config.idle_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set the listen address.
    #[must_use]
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the upstream model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the upstream endpoint.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the inactivity window.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.thinking_budget, 0);
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_api_key_fallback() {
        let config = ServerConfig::from_lookup(lookup(&[("API_KEY", "fallback")])).unwrap();
        assert_eq!(config.api_key, "fallback");

        let config = ServerConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "primary"),
            ("API_KEY", "fallback"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "primary");
    }

    #[test]
    fn test_missing_api_key() {
        let err = ServerConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("PLASTFINDER_BIND", "127.0.0.1:8080"),
            ("PLASTFINDER_MODEL", "gemini-2.5-pro"),
            ("PLASTFINDER_GEMINI_BASE_URL", "http://localhost:9000"),
            ("PLASTFINDER_IDLE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values() {
        assert!(ServerConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("PLASTFINDER_BIND", "nowhere"),
        ]))
        .is_err());
        assert!(ServerConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("PLASTFINDER_IDLE_TIMEOUT_SECS", "soon"),
        ]))
        .is_err());
    }
}
