//! Scripted upstream for testing.
//!
//! ```rust
//! use plastfinder_core::UpstreamFragment;
//! use plastfinder_models::ScriptedUpstream;
//!
//! let upstream = ScriptedUpstream::new()
//!     .with_fragments(vec![
//!         UpstreamFragment::text("{\"factoryName\":\"A\"}\n{\"facto"),
//!         UpstreamFragment::text("ryName\":\"B\"}"),
//!     ])
//!     .with_start_failure("quota exceeded");
//! ```

use crate::error::ModelError;
use crate::upstream::{FragmentStream, UpstreamModel};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use plastfinder_core::UpstreamFragment;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Script {
    Stream(Vec<Result<UpstreamFragment, String>>),
    StartFailure(String),
}

/// An upstream that replays pre-configured responses in order.
///
/// Each call to [`UpstreamModel::search_stream`] consumes the next script.
/// Once the scripts run out it returns an empty stream.
#[derive(Debug, Clone, Default)]
pub struct ScriptedUpstream {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl ScriptedUpstream {
    /// Create an upstream with no scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a stream that yields these fragments.
    #[must_use]
    pub fn with_fragments(self, fragments: Vec<UpstreamFragment>) -> Self {
        self.with_items(fragments.into_iter().map(Ok).collect())
    }

    /// Queue a stream of fragments and mid-stream failures.
    #[must_use]
    pub fn with_items(self, items: Vec<Result<UpstreamFragment, String>>) -> Self {
        self.scripts.lock().push_back(Script::Stream(items));
        self
    }

    /// Queue a call that fails before any fragment is produced.
    #[must_use]
    pub fn with_start_failure(self, message: impl Into<String>) -> Self {
        self.scripts
            .lock()
            .push_back(Script::StartFailure(message.into()));
        self
    }

    /// Wait this long before every item.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far.
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl UpstreamModel for ScriptedUpstream {
    fn name(&self) -> &str {
        "scripted"
    }

    fn system(&self) -> &str {
        "mock"
    }

    async fn search_stream(&self, prompt: &str) -> Result<FragmentStream, ModelError> {
        self.prompts.lock().push(prompt.to_string());

        let script = self.scripts.lock().pop_front();
        let items = match script {
            Some(Script::Stream(items)) => items,
            Some(Script::StartFailure(message)) => return Err(ModelError::api(message)),
            None => Vec::new(),
        };

        let items = stream::iter(items.into_iter().map(|item| item.map_err(ModelError::network)));
        match self.delay {
            Some(delay) => Ok(Box::pin(items.then(move |item| async move {
                tokio::time::sleep(delay).await;
                item
            }))),
            None => Ok(Box::pin(items)),
        }
    }
}
