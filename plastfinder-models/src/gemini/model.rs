//! Gemini model with Google Search grounding.

use super::stream::GeminiStreamParser;
use super::types::{GeminiError, GenerateContentRequest, GenerationConfig};
use crate::error::ModelError;
use crate::upstream::{FragmentStream, UpstreamModel};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Default Google AI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini model answering prompts with grounded web search.
#[derive(Debug, Clone)]
pub struct GeminiSearchModel {
    model_name: String,
    client: Client,
    api_key: String,
    base_url: String,
    header_timeout: Duration,
    temperature: Option<f64>,
    thinking_budget: Option<u64>,
}

impl GeminiSearchModel {
    /// Create a new model (uses API key).
    pub fn new(model_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            header_timeout: Duration::from_secs(120),
            temperature: Some(0.5),
            thinking_budget: Some(0),
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a custom HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Set how long to wait for response headers.
    ///
    /// The body stream itself is unbounded here; stalls while streaming are
    /// the relay's idle timeout to catch.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.header_timeout = timeout;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the thinking budget; `None` leaves the model default.
    #[must_use]
    pub fn with_thinking(mut self, budget: Option<u64>) -> Self {
        self.thinking_budget = budget;
        self
    }

    /// Build the streaming endpoint URL.
    fn build_url(&self) -> Result<Url, ModelError> {
        let raw = format!(
            "{}/v1beta/models/{}:streamGenerateContent",
            self.base_url.trim_end_matches('/'),
            self.model_name
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| ModelError::configuration(format!("invalid base URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("alt", "sse")
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Build the request body.
    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        let mut config = GenerationConfig::new();
        if let Some(temp) = self.temperature {
            config = config.temperature(temp);
        }
        if let Some(budget) = self.thinking_budget {
            config = config.with_thinking(budget);
        }

        GenerateContentRequest::new(prompt)
            .with_search()
            .with_generation_config(config)
    }

    /// Handle API error response.
    fn handle_error_response(&self, status: u16, body: &str) -> ModelError {
        if let Ok(err) = serde_json::from_str::<GeminiError>(body) {
            match status {
                401 | 403 => return ModelError::auth(err.error.message),
                429 => return ModelError::rate_limited(None),
                404 => return ModelError::NotFound(err.error.message),
                _ => {}
            }

            return ModelError::Api {
                message: err.error.message,
                code: err.error.status,
            };
        }

        match status {
            401 | 403 => ModelError::auth(body),
            429 => ModelError::rate_limited(None),
            _ => ModelError::http(status, body),
        }
    }
}

#[async_trait]
impl UpstreamModel for GeminiSearchModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn system(&self) -> &str {
        "google"
    }

    async fn search_stream(&self, prompt: &str) -> Result<FragmentStream, ModelError> {
        if self.api_key.is_empty() {
            return Err(ModelError::configuration("missing API key"));
        }

        let body = self.build_request(prompt);
        let url = self.build_url()?;

        tracing::debug!(model = %self.model_name, "Starting grounded generation");

        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send();
        let response = tokio::time::timeout(self.header_timeout, request)
            .await
            .map_err(|_| ModelError::Timeout(self.header_timeout))??;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.handle_error_response(status, &body));
        }

        let parser = GeminiStreamParser::new(response.bytes_stream());
        Ok(Box::pin(parser))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let model = GeminiSearchModel::new(DEFAULT_MODEL, "test-key");
        assert_eq!(model.name(), "gemini-2.5-flash");
        assert_eq!(model.identifier(), "google:gemini-2.5-flash");
        assert_eq!(model.temperature, Some(0.5));
        assert_eq!(model.thinking_budget, Some(0));
    }

    #[test]
    fn test_build_url() {
        let model = GeminiSearchModel::new("gemini-2.5-flash", "k&y")
            .with_base_url("http://localhost:8080/");
        let url = model.build_url().unwrap();

        assert_eq!(url.path(), "/v1beta/models/gemini-2.5-flash:streamGenerateContent");
        assert_eq!(url.query(), Some("alt=sse&key=k%26y"));
    }

    #[test]
    fn test_build_url_invalid_base() {
        let model = GeminiSearchModel::new("m", "k").with_base_url("not a url");
        assert!(matches!(model.build_url(), Err(ModelError::Configuration(_))));
    }

    #[test]
    fn test_build_request() {
        let model = GeminiSearchModel::new("m", "k").with_temperature(0.2).with_thinking(None);
        let request = model.build_request("hello");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["tools"][0]["googleSearch"], serde_json::json!({}));
        assert_eq!(value["generationConfig"]["temperature"], 0.2);
        assert!(value["generationConfig"].get("thinkingConfig").is_none());
    }

    #[test]
    fn test_handle_error_response() {
        let model = GeminiSearchModel::new("m", "k");
        let body = r#"{"error":{"code":403,"message":"denied","status":"PERMISSION_DENIED"}}"#;

        assert!(matches!(
            model.handle_error_response(403, body),
            ModelError::Authentication(msg) if msg == "denied"
        ));
        assert!(matches!(
            model.handle_error_response(429, body),
            ModelError::RateLimited { .. }
        ));
        assert!(matches!(
            model.handle_error_response(400, body),
            ModelError::Api { code: Some(code), .. } if code == "PERMISSION_DENIED"
        ));
        assert!(matches!(
            model.handle_error_response(502, "<html>"),
            ModelError::Http { status: 502, .. }
        ));
    }

    #[rstest]
    #[case(401, "auth")]
    #[case(403, "auth")]
    #[case(429, "rate_limited")]
    #[case(500, "http")]
    #[case(503, "http")]
    fn test_plain_error_bodies(#[case] status: u16, #[case] kind: &str) {
        let model = GeminiSearchModel::new("m", "k");
        let err = model.handle_error_response(status, "upstream said no");
        let actual = match err {
            ModelError::Authentication(_) => "auth",
            ModelError::RateLimited { .. } => "rate_limited",
            ModelError::Http { status: s, .. } if s == status => "http",
            _ => "other",
        };
        assert_eq!(actual, kind);
    }
}
