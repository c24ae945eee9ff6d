//! # plastfinder-core
//!
//! Core types for plastfinder.
//!
//! This crate holds the data that crosses component boundaries:
//!
//! - **[`SearchCriteria`]**: packaging requirements submitted by the user
//! - **[`SupplierRecord`]**: one supplier found by the search
//! - **[`GroundingMetadata`]**: web sources backing the results
//! - **[`UpstreamFragment`]**: a chunk of model output as delivered upstream
//! - **[`SearchHistory`]**: bounded, most-recent-first list of past searches
//!
//! It also renders the sourcing prompt ([`build_prompt`]) and provides
//! non-destructive display views ([`display`]).
//!
//! ## Example
//!
//! ```rust
//! use plastfinder_core::{SearchCriteria, SearchHistory};
//!
//! let mut history = SearchHistory::new();
//! let criteria = SearchCriteria::default();
//!
//! assert!(history.record(&criteria));
//! // An identical consecutive search is not re-added.
//! assert!(!history.record(&criteria));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod display;
pub mod error;
pub mod history;
pub mod prompt;
pub mod types;

pub use display::{priced_records, sort_for_display, unique_sources, SortOrder};
pub use error::{CoreError, CoreResult};
pub use history::{
    HistoryStore, InMemoryHistoryStore, SearchHistory, HISTORY_KEY, MAX_HISTORY_ENTRIES,
};
pub use prompt::build_prompt;
pub use types::{
    ContactInfo, GroundingChunk, GroundingMetadata, Measure, SearchCriteria, SupplierRecord,
    UpstreamFragment, WebSource, BAG_SIZES, BAG_TYPES, MATERIALS, PRINT_COLOR_RANGE,
    THICKNESS_RANGE,
};
