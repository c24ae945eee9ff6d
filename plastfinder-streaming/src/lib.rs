//! # plastfinder-streaming
//!
//! JSON Lines relay and consumer for plastfinder search streams.
//!
//! The server side turns an upstream stream of model text fragments into a
//! clean newline-delimited stream of supplier records followed by at most one
//! grounding metadata control line. The client side reassembles that byte
//! stream into records and metadata, tolerating arbitrary chunk boundaries
//! (including boundaries inside multi-byte characters).
//!
//! ## Core Concepts
//!
//! - **[`StreamRelay`]**: fragment-to-line state machine used by the server
//! - **[`spawn_relay`]**: runs the relay on a task and returns a body stream
//! - **[`StreamDecoder`]**: byte-to-line decoder used by the client
//! - **[`SearchController`]**: request-scoped result list and loading state
//! - **[`consume`]**: drives a body stream into a controller with cancellation
//! - **[`LineOutcome`]**: valid, incomplete or invalid classification of a line
//!
//! ## Example
//!
//! ```rust
//! use plastfinder_core::UpstreamFragment;
//! use plastfinder_streaming::{relay_all, StreamDecoder, WireLine};
//!
//! let lines = relay_all(vec![
//!     UpstreamFragment::text("{\"factoryName\":\"A\"}\nnot json\n{\"facto"),
//!     UpstreamFragment::text("ryName\":\"B\"}"),
//! ]);
//!
//! let mut decoder = StreamDecoder::new();
//! let mut decoded = Vec::new();
//! for line in &lines {
//!     decoded.extend(decoder.push_bytes(line));
//! }
//! decoded.extend(decoder.finish());
//!
//! assert_eq!(decoded.len(), 2);
//! assert!(matches!(&decoded[1], WireLine::Record(r) if r.factory_name == "B"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod classify;
pub mod consumer;
pub mod controller;
pub mod decode;
pub mod error;
pub mod line;
pub mod relay;
pub mod timeout;
pub mod wire;

// Re-exports
pub use classify::{
    classify_metadata, classify_record, classify_wire_line, InvalidLine, LineOutcome, WireLine,
};
pub use consumer::{DecodeStats, StreamDecoder};
pub use controller::{consume, SearchController, SearchState, SearchUpdate};
pub use decode::Utf8Decoder;
pub use error::{StreamError, StreamResult};
pub use line::{LineBuffer, MAX_LINE_LEN};
pub use relay::{
    relay_all, run_relay, spawn_relay, RelayConfig, RelayState, RelayStats, StreamRelay,
};
pub use timeout::{IdleTimeout, StreamTimeoutExt, DEFAULT_IDLE_TIMEOUT};
pub use wire::{encode_metadata, encode_record, CONTENT_TYPE, METADATA_PREFIX};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        consume, spawn_relay, LineOutcome, RelayConfig, SearchController, SearchState,
        SearchUpdate, StreamDecoder, StreamError, StreamRelay, StreamResult, WireLine,
    };
}
