//! Gemini API types.
//!
//! Only the subset of `generateContent` used for grounded text search.

use plastfinder_core::GroundingMetadata;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ============================================================================
// Request Types
// ============================================================================

/// Generate content request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Content messages.
    pub contents: Vec<Content>,
    /// Tool definitions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<GeminiTool>,
    /// Generation configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Single-turn user request.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user(prompt)],
            tools: Vec::new(),
            generation_config: None,
        }
    }

    /// Enable Google Search grounding.
    #[must_use]
    pub fn with_search(mut self) -> Self {
        self.tools.push(GeminiTool::google_search());
        self
    }

    /// Add generation config.
    #[must_use]
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// Content (message) in a conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    /// Role: "user" or "model".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create user content.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated answer text, skipping thought summaries.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

/// Content part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Whether this part is a thought summary.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub thought: bool,
}

impl Part {
    /// Text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: false,
        }
    }
}

/// Tool entry.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    /// Google Search grounding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

impl GeminiTool {
    /// The Google Search grounding tool.
    pub fn google_search() -> Self {
        Self {
            google_search: Some(GoogleSearch {}),
        }
    }
}

/// Google Search tool (no options).
#[derive(Debug, Clone, Default, Serialize)]
pub struct GoogleSearch {}

/// Generation configuration.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Thinking configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

impl GenerationConfig {
    /// Create new config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature.
    #[must_use]
    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set the thinking budget. Zero disables thinking.
    #[must_use]
    pub fn with_thinking(mut self, budget: u64) -> Self {
        self.thinking_config = Some(ThinkingConfig {
            thinking_budget: budget,
        });
        self
    }
}

/// Thinking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// Token budget for thinking.
    pub thinking_budget: u64,
}

// ============================================================================
// Response Types
// ============================================================================

/// Generate content response, one per stream event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidates.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Prompt feedback (for blocked prompts).
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// The first candidate, which is the only one requested.
    pub fn first(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// Response candidate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Content.
    #[serde(default)]
    pub content: Option<Content>,
    /// Finish reason.
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Grounding metadata.
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Prompt feedback.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Why the prompt was blocked.
    #[serde(default)]
    pub block_reason: Option<String>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Gemini API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiError {
    /// Error details.
    pub error: GeminiErrorBody,
}

/// Gemini error body.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorBody {
    /// Error code.
    #[serde(default)]
    pub code: u32,
    /// Error message.
    pub message: String,
    /// Error status.
    #[serde(default)]
    pub status: Option<String>,
    /// Error details.
    #[serde(default)]
    pub details: Vec<JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest::new("find suppliers")
            .with_search()
            .with_generation_config(GenerationConfig::new().temperature(0.5).with_thinking(0));

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [{"role": "user", "parts": [{"text": "find suppliers"}]}],
                "tools": [{"googleSearch": {}}],
                "generationConfig": {
                    "temperature": 0.5,
                    "thinkingConfig": {"thinkingBudget": 0}
                }
            })
        );
    }

    #[test]
    fn test_response_with_grounding() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "{\"factoryName\":"},
                    {"text": "\"A\"}\n"}
                ]},
                "groundingMetadata": {
                    "webSearchQueries": ["sacolas plásticas"],
                    "groundingChunks": [{"web": {"uri": "http://x", "title": "X"}}],
                    "groundingSupports": []
                }
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let candidate = response.first().unwrap();

        assert_eq!(candidate.content.as_ref().unwrap().text(), "{\"factoryName\":\"A\"}\n");
        let metadata = candidate.grounding_metadata.as_ref().unwrap();
        assert_eq!(metadata.grounding_chunks.len(), 1);
        assert_eq!(metadata.web_search_queries, vec!["sacolas plásticas"]);
    }

    #[test]
    fn test_error_body() {
        let raw = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let err: GeminiError = serde_json::from_str(raw).unwrap();
        assert_eq!(err.error.code, 400);
        assert_eq!(err.error.status.as_deref(), Some("INVALID_ARGUMENT"));
    }
}
