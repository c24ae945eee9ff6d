//! Newline framing over a text stream.
//!
//! [`LineBuffer`] accumulates fragments and hands back every complete line,
//! keeping the trailing piece (possibly empty) until more text arrives.

/// Longest partial line kept in memory before it is discarded.
pub const MAX_LINE_LEN: usize = 10 * 1024 * 1024;

/// Accumulates text and splits it into complete lines.
#[derive(Debug)]
pub struct LineBuffer {
    buffer: String,
    max_line_len: usize,
    /// Set after an oversized partial line was dropped; the rest of that
    /// line is skipped when its newline finally arrives.
    discarding: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Create a new line buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_line_len(MAX_LINE_LEN)
    }

    /// Create a line buffer with a custom partial-line limit.
    #[must_use]
    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            buffer: String::new(),
            max_line_len,
            discarding: false,
        }
    }

    /// Append a fragment and return the lines it completed.
    ///
    /// Lines are returned without their `\n` and are otherwise untouched.
    pub fn feed_str(&mut self, fragment: &str) -> Vec<String> {
        self.buffer.push_str(fragment);

        let mut lines = Vec::new();
        if let Some(last_newline) = self.buffer.rfind('\n') {
            let rest = self.buffer.split_off(last_newline + 1);
            let complete = std::mem::replace(&mut self.buffer, rest);

            let mut pieces = complete[..last_newline].split('\n');
            if self.discarding {
                pieces.next();
                self.discarding = false;
            }
            lines.extend(pieces.map(str::to_string));
        }

        if self.buffer.len() > self.max_line_len {
            tracing::warn!(
                len = self.buffer.len(),
                max = self.max_line_len,
                "Discarding oversized partial line"
            );
            self.buffer.clear();
            self.discarding = true;
        }

        lines
    }

    /// Take whatever is left once the stream has ended.
    ///
    /// Returns `None` when nothing but whitespace remains.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        if std::mem::take(&mut self.discarding) || rest.trim().is_empty() {
            return None;
        }
        Some(rest)
    }

    /// The retained partial line.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Whether no partial line is retained.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop all buffered text.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}
