//! Incremental UTF-8 decoding.
//!
//! Network chunks split multi-byte characters freely. [`Utf8Decoder`] holds
//! back an incomplete trailing sequence until the next chunk completes it, and
//! replaces genuinely invalid bytes with U+FFFD instead of failing.

/// Streaming UTF-8 decoder.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, carrying an incomplete trailing character forward.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let joined;
        let mut rest: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            let mut bytes = std::mem::take(&mut self.pending);
            bytes.extend_from_slice(chunk);
            joined = bytes;
            &joined
        };

        let mut out = String::with_capacity(rest.len());
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush at end of stream.
    ///
    /// A character left incomplete by the stream becomes one U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }

    /// Whether bytes of an incomplete character are held back.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"hello\n"), "hello\n");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_split_multibyte_character() {
        // "ç" is 0xC3 0xA7
        let bytes = "Alça".as_bytes();
        let mut decoder = Utf8Decoder::new();

        let first = decoder.decode(&bytes[..3]);
        assert_eq!(first, "Al");
        assert!(decoder.has_pending());

        let second = decoder.decode(&bytes[3..]);
        assert_eq!(second, "ça");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_four_byte_character_byte_by_byte() {
        let bytes = "📦".as_bytes();
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        for b in bytes {
            out.push_str(&decoder.decode(std::slice::from_ref(b)));
        }
        assert_eq!(out, "📦");
    }

    #[test]
    fn test_invalid_bytes_replaced() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_truncated_at_end_of_stream() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"ok\xC3"), "ok");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert!(!decoder.has_pending());
    }
}
