//! Consumer side: wire bytes to decoded lines.

use crate::classify::{classify_wire_line, LineOutcome, WireLine};
use crate::decode::Utf8Decoder;
use crate::line::LineBuffer;

/// Counters for one decode run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Record lines accepted.
    pub records: usize,
    /// Control lines accepted.
    pub metadata: usize,
    /// Non-empty lines dropped.
    pub dropped: usize,
}

/// Incremental decoder for the relay's byte stream.
///
/// Bytes go through UTF-8 reassembly, then newline framing, then
/// classification. Only accepted lines come out.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    utf8: Utf8Decoder,
    lines: LineBuffer,
    stats: DecodeStats,
}

impl StreamDecoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters so far.
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Feed a chunk and return the lines it completed.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Vec<WireLine> {
        let text = self.utf8.decode(chunk);
        self.lines
            .feed_str(&text)
            .iter()
            .filter_map(|line| self.accept(line))
            .collect()
    }

    /// End of stream: one last attempt on whatever is left.
    pub fn finish(&mut self) -> Vec<WireLine> {
        let tail = self.utf8.finish();
        let mut out: Vec<WireLine> = self
            .lines
            .feed_str(&tail)
            .iter()
            .filter_map(|line| self.accept(line))
            .collect();

        if let Some(rest) = self.lines.finish() {
            out.extend(self.accept(&rest));
        }
        out
    }

    fn accept(&mut self, line: &str) -> Option<WireLine> {
        if line.trim().is_empty() {
            return None;
        }

        match classify_wire_line(line) {
            LineOutcome::Valid(wire) => {
                match wire {
                    WireLine::Record(_) => self.stats.records += 1,
                    WireLine::Metadata(_) => self.stats.metadata += 1,
                }
                Some(wire)
            }
            LineOutcome::Incomplete => {
                tracing::debug!(line, "Dropping truncated stream line");
                self.stats.dropped += 1;
                None
            }
            LineOutcome::Invalid(reason) => {
                tracing::debug!(%reason, line, "Dropping stream line");
                self.stats.dropped += 1;
                None
            }
        }
    }
}
