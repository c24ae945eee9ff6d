//! Line classification.
//!
//! Each complete line is classified as [`LineOutcome::Valid`],
//! [`LineOutcome::Incomplete`] (truncated JSON, more bytes could have fixed
//! it) or [`LineOutcome::Invalid`] (permanently malformed, or well-formed but
//! missing the factory name). Both non-valid outcomes are dropped by the relay
//! and the consumer; the distinction exists for logging and tests.

use crate::wire::METADATA_PREFIX;
use plastfinder_core::{GroundingMetadata, SupplierRecord};
use serde_json::error::Category;
use thiserror::Error;

/// Result of classifying one line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome<T> {
    /// Parsed and accepted.
    Valid(T),
    /// Truncated structured text.
    Incomplete,
    /// Malformed or rejected.
    Invalid(InvalidLine),
}

impl<T> LineOutcome<T> {
    /// Map the valid payload.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> LineOutcome<U> {
        match self {
            Self::Valid(value) => LineOutcome::Valid(f(value)),
            Self::Incomplete => LineOutcome::Incomplete,
            Self::Invalid(reason) => LineOutcome::Invalid(reason),
        }
    }

    /// The valid payload, if any.
    pub fn valid(self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the line was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidLine {
    /// Not valid structured text.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Valid structured text of the wrong shape.
    #[error("unexpected shape: {0}")]
    Shape(String),

    /// A record without a non-empty factory name.
    #[error("record has no factory name")]
    MissingFactoryName,
}

/// A decoded line of the wire protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum WireLine {
    /// A supplier record line.
    Record(SupplierRecord),
    /// The control line carrying grounding metadata.
    Metadata(GroundingMetadata),
}

/// Classify a line as a supplier record.
pub fn classify_record(line: &str) -> LineOutcome<SupplierRecord> {
    match serde_json::from_str::<SupplierRecord>(line.trim()) {
        Ok(record) if record.has_factory_name() => LineOutcome::Valid(record),
        Ok(_) => LineOutcome::Invalid(InvalidLine::MissingFactoryName),
        Err(e) => from_json_error(&e),
    }
}

/// Classify a control-line payload (prefix already stripped) as metadata.
pub fn classify_metadata(payload: &str) -> LineOutcome<GroundingMetadata> {
    match serde_json::from_str::<GroundingMetadata>(payload.trim()) {
        Ok(metadata) => LineOutcome::Valid(metadata),
        Err(e) => from_json_error(&e),
    }
}

/// Classify a line received over the wire.
///
/// Lines starting with [`METADATA_PREFIX`] are control lines; everything else
/// is a record line.
pub fn classify_wire_line(line: &str) -> LineOutcome<WireLine> {
    let line = line.trim();
    match line.strip_prefix(METADATA_PREFIX) {
        Some(payload) => classify_metadata(payload).map(WireLine::Metadata),
        None => classify_record(line).map(WireLine::Record),
    }
}

fn from_json_error<T>(err: &serde_json::Error) -> LineOutcome<T> {
    match err.classify() {
        Category::Eof => LineOutcome::Incomplete,
        Category::Data => LineOutcome::Invalid(InvalidLine::Shape(err.to_string())),
        Category::Syntax | Category::Io => {
            LineOutcome::Invalid(InvalidLine::Syntax(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_valid_record() {
        let outcome = classify_record(r#"  {"factoryName":"A","location":"X"}  "#);
        let record = outcome.valid().unwrap();
        assert_eq!(record.factory_name, "A");
        assert_eq!(record.location, "X");
    }

    #[rstest]
    #[case(r#"{"factoryName":"A""#)]
    #[case(r#"{"facto"#)]
    #[case("{")]
    #[case(r#"{"factoryName":"A","contact":{"phone":"#)]
    fn test_incomplete(#[case] line: &str) {
        assert_eq!(classify_record(line), LineOutcome::Incomplete);
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"factoryName":"A"} trailing"#)]
    #[case(r#"ryName":"B"}"#)]
    #[case("```json")]
    fn test_syntax_invalid(#[case] line: &str) {
        assert!(matches!(
            classify_record(line),
            LineOutcome::Invalid(InvalidLine::Syntax(_))
        ));
    }

    #[rstest]
    #[case("42")]
    #[case(r#""text""#)]
    #[case(r#"[{"factoryName":"A"}]"#)]
    fn test_shape_invalid(#[case] line: &str) {
        assert!(matches!(
            classify_record(line),
            LineOutcome::Invalid(InvalidLine::Shape(_))
        ));
    }

    #[rstest]
    #[case(r#"{"location":"no name"}"#)]
    #[case(r#"{"factoryName":""}"#)]
    #[case(r#"{"factoryName":"   ","location":"X"}"#)]
    #[case(r#"{"factoryName":null}"#)]
    fn test_missing_factory_name(#[case] line: &str) {
        assert_eq!(
            classify_record(line),
            LineOutcome::Invalid(InvalidLine::MissingFactoryName)
        );
    }

    #[rstest]
    #[case(r#"{"factoryName":"A","contact":"(11) 5555-0000"}"#)]
    #[case(r#"{"factoryName":"A","isFeatured":"no"}"#)]
    #[case(r#"{"factoryName":"A","foundThickness":[40,50]}"#)]
    fn test_odd_optional_field_still_valid(#[case] line: &str) {
        assert!(classify_record(line).is_valid());
    }

    #[test]
    fn test_wire_metadata_line() {
        let line = r#"__METADATA__:{"groundingChunks":[{"web":{"uri":"http://x","title":"X"}}]}"#;
        match classify_wire_line(line) {
            LineOutcome::Valid(WireLine::Metadata(metadata)) => {
                assert_eq!(metadata.grounding_chunks.len(), 1);
            }
            other => panic!("Expected metadata, got {:?}", other),
        }
    }

    #[test]
    fn test_wire_metadata_line_malformed() {
        assert!(!classify_wire_line("__METADATA__:{oops}").is_valid());
        assert_eq!(
            classify_wire_line(r#"__METADATA__:{"groundingChunks":["#),
            LineOutcome::Incomplete
        );
    }

    #[test]
    fn test_wire_record_line() {
        let outcome = classify_wire_line(r#"{"factoryName":"C"}"#);
        assert!(matches!(
            outcome,
            LineOutcome::Valid(WireLine::Record(r)) if r.factory_name == "C"
        ));
    }
}
