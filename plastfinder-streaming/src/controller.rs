//! Request-scoped search state.
//!
//! A [`SearchController`] owns the result list, the metadata slot and the
//! loading state of one search. It only changes through its transition
//! methods, which return a [`SearchUpdate`] describing what changed.
//! [`consume`] pumps a byte stream through a [`StreamDecoder`] into a
//! controller and honours a [`CancellationToken`].

use crate::classify::WireLine;
use crate::consumer::StreamDecoder;
use crate::error::{StreamError, StreamResult};
use crate::timeout::StreamTimeoutExt;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use plastfinder_core::{GroundingMetadata, SearchCriteria, SupplierRecord};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// No search started.
    Idle,
    /// Receiving lines.
    Streaming,
    /// Stream ended, flushing the trailing buffer.
    Draining,
    /// Finished normally.
    Done,
    /// Ended by a transport error.
    Failed,
    /// Abandoned by its owner.
    Cancelled,
}

impl SearchState {
    /// Whether no further updates can happen.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }
}

/// What a transition changed.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchUpdate {
    /// A search started; results were reset.
    Started,
    /// A record was appended at `index`.
    RecordAdded {
        /// Position in the result list.
        index: usize,
    },
    /// The metadata slot was replaced.
    MetadataReplaced,
    /// The search finished.
    Completed,
    /// The search failed with a user-facing message.
    Failed(String),
    /// The search was cancelled.
    Cancelled,
}

/// State of one search request.
#[derive(Debug, Clone)]
pub struct SearchController {
    criteria: Option<SearchCriteria>,
    state: SearchState,
    results: Vec<SupplierRecord>,
    metadata: Option<GroundingMetadata>,
    error: Option<String>,
    featured: Option<SupplierRecord>,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criteria: None,
            state: SearchState::Idle,
            results: Vec::new(),
            metadata: None,
            error: None,
            featured: None,
        }
    }

    /// Seed every search with a featured record placed first.
    #[must_use]
    pub fn with_featured(mut self, record: SupplierRecord) -> Self {
        self.featured = Some(record);
        self
    }

    /// Current state.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Whether a search is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, SearchState::Streaming | SearchState::Draining)
    }

    /// Criteria of the current search.
    pub fn criteria(&self) -> Option<&SearchCriteria> {
        self.criteria.as_ref()
    }

    /// Results in arrival order.
    pub fn results(&self) -> &[SupplierRecord] {
        &self.results
    }

    /// Latest grounding metadata.
    pub fn metadata(&self) -> Option<&GroundingMetadata> {
        self.metadata.as_ref()
    }

    /// User-facing error of a failed search.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a search, discarding the previous one.
    pub fn begin(&mut self, criteria: SearchCriteria) -> SearchUpdate {
        self.criteria = Some(criteria);
        self.results = self.featured.iter().cloned().collect();
        self.metadata = None;
        self.error = None;
        self.state = SearchState::Streaming;
        SearchUpdate::Started
    }

    /// Apply a decoded line.
    ///
    /// Ignored unless the search is streaming or draining.
    pub fn apply(&mut self, line: WireLine) -> Option<SearchUpdate> {
        if !self.is_loading() {
            tracing::debug!(state = ?self.state, "Ignoring line outside an active search");
            return None;
        }

        match line {
            WireLine::Record(record) => {
                self.results.push(record);
                Some(SearchUpdate::RecordAdded {
                    index: self.results.len() - 1,
                })
            }
            WireLine::Metadata(metadata) => {
                self.metadata = Some(metadata);
                Some(SearchUpdate::MetadataReplaced)
            }
        }
    }

    /// The stream ended; the trailing buffer is being flushed.
    pub fn drain(&mut self) {
        if self.state == SearchState::Streaming {
            self.state = SearchState::Draining;
        }
    }

    /// Finish the search.
    pub fn complete(&mut self) -> Option<SearchUpdate> {
        if !self.is_loading() {
            return None;
        }
        self.state = SearchState::Done;
        Some(SearchUpdate::Completed)
    }

    /// Fail the search. Results received so far are kept.
    pub fn fail(&mut self, error: &StreamError) -> Option<SearchUpdate> {
        if self.state.is_terminal() {
            return None;
        }
        let message = error.to_string();
        self.error = Some(message.clone());
        self.state = SearchState::Failed;
        Some(SearchUpdate::Failed(message))
    }

    /// Cancel the search. No further lines are applied.
    pub fn cancel(&mut self) -> Option<SearchUpdate> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = SearchState::Cancelled;
        Some(SearchUpdate::Cancelled)
    }

    /// Back to idle with an empty result list.
    pub fn reset(&mut self) {
        *self = Self {
            featured: self.featured.take(),
            ..Self::new()
        };
    }
}

/// Pump a response body into a controller that has already begun a search.
///
/// Every transition is reported to `on_update` together with the controller,
/// in arrival order. A transport error or inactivity timeout fails the search;
/// cancellation stops it without applying anything further. Malformed lines
/// are dropped without interrupting the stream.
pub async fn consume<S, F>(
    controller: &mut SearchController,
    body: S,
    cancel: &CancellationToken,
    idle_timeout: Duration,
    mut on_update: F,
) -> StreamResult<()>
where
    S: Stream<Item = StreamResult<Bytes>>,
    F: FnMut(&SearchController, &SearchUpdate),
{
    let mut decoder = StreamDecoder::new();
    let body = body.idle_timeout(idle_timeout);
    futures::pin_mut!(body);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            next = body.next() => Some(next),
        };

        let chunk = match next {
            None => return cancelled(controller, &mut on_update),
            Some(None) => break,
            Some(Some(Ok(Ok(chunk)))) => chunk,
            Some(Some(Ok(Err(e)) | Err(e))) => {
                if let Some(update) = controller.fail(&e) {
                    on_update(controller, &update);
                }
                return Err(e);
            }
        };

        for line in decoder.push_bytes(&chunk) {
            if cancel.is_cancelled() {
                return cancelled(controller, &mut on_update);
            }
            if let Some(update) = controller.apply(line) {
                on_update(controller, &update);
            }
        }
    }

    controller.drain();
    for line in decoder.finish() {
        if let Some(update) = controller.apply(line) {
            on_update(controller, &update);
        }
    }

    let stats = decoder.stats();
    tracing::debug!(
        records = stats.records,
        metadata = stats.metadata,
        dropped = stats.dropped,
        "Stream consumed"
    );

    if let Some(update) = controller.complete() {
        on_update(controller, &update);
    }
    Ok(())
}

fn cancelled<F>(controller: &mut SearchController, on_update: &mut F) -> StreamResult<()>
where
    F: FnMut(&SearchController, &SearchUpdate),
{
    if let Some(update) = controller.cancel() {
        on_update(controller, &update);
    }
    Err(StreamError::Cancelled)
}
