//! Presentation helpers over a result set.
//!
//! Everything here borrows the result collection and returns a new view; the
//! collection itself stays in arrival order.

use crate::types::{GroundingMetadata, SupplierRecord, WebSource};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort key for the result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Cheapest minimum price first.
    #[default]
    Price,
    /// Shortest average lead time first.
    LeadTime,
}

impl SortOrder {
    fn key(self, record: &SupplierRecord) -> f64 {
        let value = match self {
            Self::Price => record.min_price,
            Self::LeadTime => record.avg_lead_time_days,
        };
        value.unwrap_or(f64::INFINITY)
    }

    fn compare(self, a: &SupplierRecord, b: &SupplierRecord) -> Ordering {
        self.key(a).total_cmp(&self.key(b))
    }
}

/// Featured listings, in arrival order.
pub fn featured(records: &[SupplierRecord]) -> Vec<&SupplierRecord> {
    records.iter().filter(|r| r.is_featured()).collect()
}

/// Non-featured records sorted for display.
///
/// Records without the sort value go last; ties keep arrival order.
pub fn sort_for_display(records: &[SupplierRecord], order: SortOrder) -> Vec<&SupplierRecord> {
    let mut view: Vec<_> = records.iter().filter(|r| !r.is_featured()).collect();
    view.sort_by(|a, b| order.compare(a, b));
    view
}

/// Records with a positive minimum price, cheapest first (price chart data).
pub fn priced_records(records: &[SupplierRecord]) -> Vec<&SupplierRecord> {
    let mut view: Vec<_> = records
        .iter()
        .filter(|r| r.min_price.is_some_and(|p| p > 0.0))
        .collect();
    view.sort_by(|a, b| SortOrder::Price.compare(a, b));
    view
}

/// Web sources with a URI, one per URI.
///
/// A repeated URI keeps the position of its first occurrence and the title of
/// its last.
pub fn unique_sources(metadata: &GroundingMetadata) -> Vec<&WebSource> {
    let mut by_uri: IndexMap<&str, &WebSource> = IndexMap::new();
    for source in metadata.web_sources().filter(|s| !s.uri.is_empty()) {
        by_uri.insert(source.uri.as_str(), source);
    }
    by_uri.into_values().collect()
}
