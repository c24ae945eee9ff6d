//! Gemini implementation of [`UpstreamModel`](crate::UpstreamModel).
//!
//! Requests go to `:streamGenerateContent?alt=sse` with the Google Search
//! tool enabled, so the answer is grounded in live web results and the
//! sources come back as grounding metadata on the stream.
//!
//! ## Example
//!
//! ```rust,ignore
//! use plastfinder_models::gemini::GeminiSearchModel;
//! use plastfinder_models::UpstreamModel;
//!
//! let model = GeminiSearchModel::new("gemini-2.5-flash", api_key)
//!     .with_temperature(0.5)
//!     .with_thinking(Some(0));
//!
//! let mut fragments = model.search_stream(&prompt).await?;
//! ```

pub mod model;
pub mod stream;
pub mod types;

// Re-exports
pub use model::{GeminiSearchModel, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use stream::GeminiStreamParser;
pub use types::{
    Candidate, Content, GeminiError, GeminiErrorBody, GeminiTool, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, GoogleSearch, Part, PromptFeedback,
    ThinkingConfig,
};
