//! Plain-text rendering for the terminal.

use plastfinder_core::{
    priced_records, sort_for_display, unique_sources, GroundingMetadata, SearchHistory,
    SortOrder, SupplierRecord,
};
use std::fmt::Write;

/// One record as it arrives.
pub fn record_line(index: usize, record: &SupplierRecord) -> String {
    let mut line = format!("{:>3}. {}", index + 1, record.factory_name);
    if record.is_featured() {
        line.push_str(" [featured]");
    }
    if !record.location.is_empty() {
        let _ = write!(line, " ({})", record.location);
    }
    if !record.estimated_price_range.is_empty() {
        let _ = write!(line, " | {}", record.estimated_price_range);
    }
    if !record.estimated_lead_time.is_empty() {
        let _ = write!(line, " | {}", record.estimated_lead_time);
    }
    if let Some(website) = &record.contact.website {
        let _ = write!(line, " | {website}");
    }
    line
}

/// Search results ordered for comparison, featured listings excluded.
pub fn summary_table(records: &[SupplierRecord], order: SortOrder) -> Vec<String> {
    sort_for_display(records, order)
        .into_iter()
        .map(|r| {
            format!(
                "{:<40} {:>10} {:>10}",
                truncate(&r.factory_name, 40),
                r.min_price.map(|p| format!("R$ {p:.2}")).unwrap_or_else(|| "-".into()),
                r.avg_lead_time_days
                    .map(|d| format!("{d} d"))
                    .unwrap_or_else(|| "-".into()),
            )
        })
        .collect()
}

/// Minimum prices, cheapest first, as a text bar chart.
pub fn price_chart(records: &[SupplierRecord]) -> Vec<String> {
    let priced = priced_records(records);
    let max = priced
        .iter()
        .filter_map(|r| r.min_price)
        .fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return Vec::new();
    }

    priced
        .into_iter()
        .filter_map(|r| {
            let price = r.min_price?;
            let width = ((price / max) * 30.0).round().max(1.0) as usize;
            Some(format!(
                "{:<24} {} R$ {price:.2}",
                truncate(&r.factory_name, 24),
                "#".repeat(width)
            ))
        })
        .collect()
}

/// Deduplicated source links.
pub fn source_lines(metadata: &GroundingMetadata) -> Vec<String> {
    unique_sources(metadata)
        .into_iter()
        .map(|s| {
            if s.title.is_empty() {
                s.uri.clone()
            } else {
                format!("{} <{}>", s.title, s.uri)
            }
        })
        .collect()
}

/// Saved searches, most recent first, numbered from 1.
pub fn history_lines(history: &SearchHistory) -> Vec<String> {
    history
        .entries()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:>3}. {}", i + 1, c.summary()))
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
