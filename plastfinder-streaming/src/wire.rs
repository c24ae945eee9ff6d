//! Wire protocol between the relay and the consumer.
//!
//! The response body is newline-delimited text:
//!
//! ```text
//! {"factoryName":"A","location":"X"}
//! {"factoryName":"B"}
//! __METADATA__:{"groundingChunks":[{"web":{"uri":"http://x","title":"X"}}]}
//! ```
//!
//! Zero or more record lines in arrival order, then at most one control line
//! as the final line. Every record line is re-serialized by the relay and
//! always carries a non-empty `factoryName`.

use crate::error::StreamResult;
use bytes::Bytes;
use plastfinder_core::{GroundingMetadata, SupplierRecord};

/// Prefix that marks the metadata control line.
pub const METADATA_PREFIX: &str = "__METADATA__:";

/// Content type of the response body.
pub const CONTENT_TYPE: &str = "application/jsonl; charset=utf-8";

/// Encode a record as one compact line.
pub fn encode_record(record: &SupplierRecord) -> StreamResult<Bytes> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// Encode grounding metadata as the control line.
pub fn encode_metadata(metadata: &GroundingMetadata) -> StreamResult<Bytes> {
    let mut line = METADATA_PREFIX.as_bytes().to_vec();
    serde_json::to_writer(&mut line, metadata)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plastfinder_core::GroundingChunk;

    #[test]
    fn test_encode_record_single_line() {
        let record = SupplierRecord::new("Multi\nLine").with_location("X");
        let bytes = encode_record(&record).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();

        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('\n').count(), 1);
        assert!(text.starts_with(r#"{"factoryName":"Multi\nLine","location":"X""#));
    }

    #[test]
    fn test_encode_metadata() {
        let metadata = GroundingMetadata::new(vec![GroundingChunk::web("http://x", "X")]);
        let bytes = encode_metadata(&metadata).unwrap();
        assert_eq!(
            &bytes[..],
            b"__METADATA__:{\"groundingChunks\":[{\"web\":{\"uri\":\"http://x\",\"title\":\"X\"}}]}\n"
        );
    }
}
