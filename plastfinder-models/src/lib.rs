//! # plastfinder-models
//!
//! Upstream AI client for plastfinder.
//!
//! The [`UpstreamModel`] trait is the seam between the HTTP surface and the
//! generative model: given a prompt it starts a grounded web search and
//! returns a [`FragmentStream`] of text chunks, some of which carry grounding
//! metadata.
//!
//! ## Implementations
//!
//! - **[`GeminiSearchModel`]**: Gemini `streamGenerateContent` with Google Search
//! - **[`ScriptedUpstream`]**: replays canned fragments, for tests
//!
//! ## Example
//!
//! ```rust
//! use plastfinder_models::{ScriptedUpstream, UpstreamModel};
//!
//! let upstream = ScriptedUpstream::new();
//! assert_eq!(upstream.identifier(), "mock:scripted");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod gemini;
pub mod mock;
pub mod upstream;

// Re-exports
pub use error::{ModelError, ModelResult};
pub use gemini::GeminiSearchModel;
pub use mock::ScriptedUpstream;
pub use upstream::{BoxedUpstream, FragmentStream, UpstreamModel};
