//! The upstream model seam.

use crate::error::ModelError;
use async_trait::async_trait;
use futures::Stream;
use plastfinder_core::UpstreamFragment;
use std::pin::Pin;
use std::sync::Arc;

/// Stream of text fragments from the upstream service.
pub type FragmentStream =
    Pin<Box<dyn Stream<Item = Result<UpstreamFragment, ModelError>> + Send>>;

/// A generative model that answers a prompt with grounded web search,
/// delivering its output incrementally.
#[async_trait]
pub trait UpstreamModel: Send + Sync {
    /// Model name.
    fn name(&self) -> &str;

    /// Provider identifier.
    fn system(&self) -> &str;

    /// Full model identifier.
    fn identifier(&self) -> String {
        format!("{}:{}", self.system(), self.name())
    }

    /// Start a streamed, search-grounded generation.
    ///
    /// An `Err` means the stream could not be started at all. Errors after
    /// that arrive as items of the returned stream.
    async fn search_stream(&self, prompt: &str) -> Result<FragmentStream, ModelError>;
}

/// Shared model for dynamic dispatch.
pub type BoxedUpstream = Arc<dyn UpstreamModel>;
