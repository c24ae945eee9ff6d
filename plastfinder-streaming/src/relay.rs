//! Producer side: upstream fragments to wire lines.
//!
//! [`StreamRelay`] is the synchronous core. It buffers fragment text, emits a
//! re-serialized line for every complete line that parses as a record with a
//! factory name, remembers the last grounding metadata it saw, and on
//! [`StreamRelay::finish`] flushes the trailing buffer and writes the single
//! metadata control line.
//!
//! [`run_relay`] drives it over an async upstream and writes into a channel;
//! [`spawn_relay`] runs that loop on its own task and hands back the receiving
//! end as a byte stream suitable for an HTTP body.

use crate::classify::{classify_record, LineOutcome};
use crate::line::LineBuffer;
use crate::timeout::{StreamTimeoutExt, DEFAULT_IDLE_TIMEOUT};
use crate::wire::{encode_metadata, encode_record};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use plastfinder_core::{GroundingMetadata, UpstreamFragment};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

/// Lifecycle of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// No fragment seen yet.
    Idle,
    /// Receiving fragments.
    Streaming,
    /// Upstream ended, flushing the trailing buffer.
    Draining,
    /// Metadata written, nothing more will be emitted.
    Done,
}

/// Counters for one relay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Fragments received.
    pub fragments: usize,
    /// Record lines emitted.
    pub records: usize,
    /// Non-empty lines dropped.
    pub dropped: usize,
    /// Whether a metadata line was emitted.
    pub metadata_emitted: bool,
}

/// Line relay state machine.
#[derive(Debug)]
pub struct StreamRelay {
    lines: LineBuffer,
    metadata: Option<GroundingMetadata>,
    state: RelayState,
    stats: RelayStats,
}

impl Default for StreamRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamRelay {
    /// Create a new relay.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: LineBuffer::new(),
            metadata: None,
            state: RelayState::Idle,
            stats: RelayStats::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Whether metadata is waiting to be written at the end.
    pub fn has_pending_metadata(&self) -> bool {
        self.metadata.is_some()
    }

    /// Process one upstream fragment and return the lines to write.
    pub fn push_fragment(&mut self, fragment: UpstreamFragment) -> Vec<Bytes> {
        match self.state {
            RelayState::Idle => self.state = RelayState::Streaming,
            RelayState::Streaming => {}
            RelayState::Draining | RelayState::Done => {
                tracing::warn!(state = ?self.state, "Ignoring fragment after upstream end");
                return Vec::new();
            }
        }

        self.stats.fragments += 1;
        if let Some(metadata) = fragment.grounding_metadata {
            self.metadata = Some(metadata);
        }

        self.lines
            .feed_str(&fragment.text)
            .iter()
            .filter_map(|line| self.relay_line(line))
            .collect()
    }

    /// Flush the trailing buffer and the metadata line.
    ///
    /// Returns nothing on a second call.
    pub fn finish(&mut self) -> Vec<Bytes> {
        if self.state == RelayState::Done {
            return Vec::new();
        }
        self.state = RelayState::Draining;

        let mut out = Vec::new();
        if let Some(rest) = self.lines.finish() {
            out.extend(self.relay_line(&rest));
        }

        if let Some(metadata) = self.metadata.take() {
            match encode_metadata(&metadata) {
                Ok(line) => {
                    self.stats.metadata_emitted = true;
                    out.push(line);
                }
                Err(e) => tracing::warn!(error = %e, "Failed to encode grounding metadata"),
            }
        }

        self.state = RelayState::Done;
        out
    }

    fn relay_line(&mut self, line: &str) -> Option<Bytes> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match classify_record(line) {
            LineOutcome::Valid(record) => match encode_record(&record) {
                Ok(bytes) => {
                    self.stats.records += 1;
                    Some(bytes)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to encode supplier record");
                    self.stats.dropped += 1;
                    None
                }
            },
            LineOutcome::Incomplete => {
                tracing::debug!(line, "Dropping truncated line");
                self.stats.dropped += 1;
                None
            }
            LineOutcome::Invalid(reason) => {
                tracing::debug!(%reason, line, "Dropping line");
                self.stats.dropped += 1;
                None
            }
        }
    }
}

/// Settings for [`run_relay`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Upstream inactivity window; on expiry the relay drains as if the
    /// upstream had ended.
    pub idle_timeout: Duration,
    /// Lines buffered between the relay task and the writer.
    pub channel_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            channel_capacity: 16,
        }
    }
}

impl RelayConfig {
    /// Set the inactivity window.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }
}

/// Relay an upstream fragment stream into `sink`.
///
/// The loop is strictly sequential: read a fragment, process it, write its
/// lines, then read the next one. An upstream error or stall ends the input
/// early but still drains the buffer and writes metadata, because the
/// response has already started. A closed `sink` (client gone) stops the
/// relay immediately.
pub async fn run_relay<S, E>(
    upstream: S,
    sink: mpsc::Sender<Bytes>,
    config: RelayConfig,
) -> RelayStats
where
    S: Stream<Item = Result<UpstreamFragment, E>>,
    E: std::fmt::Display,
{
    let mut relay = StreamRelay::new();
    let upstream = upstream.idle_timeout(config.idle_timeout);
    futures::pin_mut!(upstream);

    while let Some(next) = upstream.next().await {
        let fragment = match next {
            Ok(Ok(fragment)) => fragment,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Upstream stream failed; draining");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upstream stalled; draining");
                break;
            }
        };

        for line in relay.push_fragment(fragment) {
            if sink.send(line).await.is_err() {
                tracing::debug!("Receiver closed; stopping relay");
                return relay.stats();
            }
        }
    }

    for line in relay.finish() {
        if sink.send(line).await.is_err() {
            tracing::debug!("Receiver closed during drain");
            break;
        }
    }

    let stats = relay.stats();
    tracing::info!(
        fragments = stats.fragments,
        records = stats.records,
        dropped = stats.dropped,
        metadata = stats.metadata_emitted,
        "Relay finished"
    );
    stats
}

/// Run [`run_relay`] on a new task, inside the caller's current span.
///
/// Dropping the returned stream closes the channel, which stops the task at
/// its next write.
pub fn spawn_relay<S, E>(
    upstream: S,
    config: RelayConfig,
) -> (ReceiverStream<Bytes>, JoinHandle<RelayStats>)
where
    S: Stream<Item = Result<UpstreamFragment, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let task = run_relay(upstream, tx, config).instrument(tracing::Span::current());
    let handle = tokio::spawn(task);
    (ReceiverStream::new(rx), handle)
}

/// Relay a whole fragment sequence without a channel (tests, batch use).
pub fn relay_all<I>(fragments: I) -> Vec<Bytes>
where
    I: IntoIterator<Item = UpstreamFragment>,
{
    let mut relay = StreamRelay::new();
    let mut out: Vec<Bytes> = fragments
        .into_iter()
        .flat_map(|f| relay.push_fragment(f))
        .collect();
    out.extend(relay.finish());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use plastfinder_core::GroundingChunk;
    use pretty_assertions::assert_eq;

    fn text(lines: &[Bytes]) -> Vec<String> {
        lines
            .iter()
            .map(|b| String::from_utf8(b.to_vec()).unwrap())
            .collect()
    }

    fn metadata(uri: &str) -> GroundingMetadata {
        GroundingMetadata::new(vec![GroundingChunk::web(uri, "T")])
    }

    #[test]
    fn test_state_transitions() {
        let mut relay = StreamRelay::new();
        assert_eq!(relay.state(), RelayState::Idle);

        relay.push_fragment(UpstreamFragment::text("{\"factoryName\":\"A\"}\n"));
        assert_eq!(relay.state(), RelayState::Streaming);

        relay.finish();
        assert_eq!(relay.state(), RelayState::Done);
        assert!(relay.finish().is_empty());
        let late = UpstreamFragment::text("{\"factoryName\":\"B\"}\n");
        assert!(relay.push_fragment(late).is_empty());
    }

    #[test]
    fn test_reserializes_records() {
        let mut relay = StreamRelay::new();
        let out = relay.push_fragment(UpstreamFragment::text(
            "  {\"factoryName\": \"A\",  \"location\": \"X\"}  \n",
        ));
        let lines = text(&out);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(r#"{"factoryName":"A","location":"X""#));
        assert!(lines[0].ends_with("}\n"));
    }

    #[test]
    fn test_split_line_across_fragments() {
        let mut relay = StreamRelay::new();
        assert!(relay.push_fragment(UpstreamFragment::text("{\"factoryName\":")).is_empty());
        let out = relay.push_fragment(UpstreamFragment::text("\"A\"}\n"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_drops_invalid_and_nameless() {
        let mut relay = StreamRelay::new();
        let out = relay.push_fragment(UpstreamFragment::text(
            "not json\n{\"location\":\"no name\"}\n\n{\"factoryName\":\"C\"}\n",
        ));
        assert_eq!(out.len(), 1);
        assert_eq!(relay.stats().dropped, 2);
    }

    #[test]
    fn test_odd_optional_fields_do_not_drop_records() {
        let out = relay_all(vec![UpstreamFragment::text(concat!(
            "{\"factoryName\":\"A\",\"contact\":\"(11) 5555-0000\"}\n",
            "{\"factoryName\":\"B\",\"isFeatured\":\"no\"}\n",
            "{\"factoryName\":\"C\",\"foundThickness\":[40,50]}\n",
        ))]);

        assert_eq!(
            text(&out),
            vec![
                "{\"factoryName\":\"A\"}\n",
                "{\"factoryName\":\"B\"}\n",
                "{\"factoryName\":\"C\"}\n",
            ]
        );
    }

    #[test]
    fn test_trailing_buffer_flushed() {
        let mut relay = StreamRelay::new();
        assert!(relay.push_fragment(UpstreamFragment::text("{\"factoryName\":\"A\"}")).is_empty());
        let out = relay.finish();
        assert_eq!(out.len(), 1);
        assert_eq!(relay.stats().records, 1);
    }

    #[test]
    fn test_metadata_last_write_wins_and_emitted_last() {
        let mut relay = StreamRelay::new();
        relay.push_fragment(
            UpstreamFragment::text("{\"factoryName\":\"A\"}\n").with_metadata(metadata("http://1")),
        );
        relay.push_fragment(
            UpstreamFragment::text("{\"factoryName\":\"B\"}").with_metadata(metadata("http://2")),
        );
        assert!(relay.has_pending_metadata());

        let lines = text(&relay.finish());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"B\""));
        assert!(lines[1].starts_with("__METADATA__:"));
        assert!(lines[1].contains("http://2"));
        assert!(!lines[1].contains("http://1"));
        assert!(relay.stats().metadata_emitted);
    }

    #[test]
    fn test_no_metadata_no_control_line() {
        let out = relay_all(vec![UpstreamFragment::text("{\"factoryName\":\"A\"}\n")]);
        assert_eq!(out.len(), 1);
        assert!(!text(&out)[0].starts_with("__METADATA__:"));
    }

    #[test]
    fn test_upstream_control_prefix_is_not_forwarded() {
        let out = relay_all(vec![UpstreamFragment::text(
            "__METADATA__:{\"groundingChunks\":[]}\n",
        )]);
        assert!(out.is_empty());
    }
}
