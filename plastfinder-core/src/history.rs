//! Search history persistence.
//!
//! The history is a bounded, most-recent-first list of submitted
//! [`SearchCriteria`], stored as JSON under a fixed key in a
//! [`HistoryStore`]. Storage backends only move strings; the (de)serialization
//! lives here.

use crate::error::CoreResult;
use crate::types::SearchCriteria;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Key the history is stored under.
pub const HISTORY_KEY: &str = "searchHistory";

/// Maximum number of remembered searches.
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// Previously submitted searches, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHistory {
    entries: Vec<SearchCriteria>,
}

impl SearchHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored entries, dropping anything past the bound.
    pub fn from_entries(mut entries: Vec<SearchCriteria>) -> Self {
        entries.truncate(MAX_HISTORY_ENTRIES);
        Self { entries }
    }

    /// Record a submitted search.
    ///
    /// Returns `false` when the search is identical to the most recent one and
    /// was therefore not added.
    pub fn record(&mut self, criteria: &SearchCriteria) -> bool {
        if self.entries.first() == Some(criteria) {
            return false;
        }
        self.entries.insert(0, criteria.clone());
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        true
    }

    /// All entries, most recent first.
    pub fn entries(&self) -> &[SearchCriteria] {
        &self.entries
    }

    /// Entry at `index` (0 is the most recent).
    pub fn get(&self, index: usize) -> Option<&SearchCriteria> {
        self.entries.get(index)
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&SearchCriteria> {
        self.entries.first()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load the history from a store.
    ///
    /// A missing or unreadable value yields an empty history; the store
    /// itself failing is an error.
    pub async fn load(store: &dyn HistoryStore) -> CoreResult<Self> {
        let Some(raw) = store.read(HISTORY_KEY).await? else {
            return Ok(Self::new());
        };

        match serde_json::from_str::<Vec<SearchCriteria>>(&raw) {
            Ok(entries) => Ok(Self::from_entries(entries)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable search history");
                Ok(Self::new())
            }
        }
    }

    /// Save the history to a store.
    pub async fn save(&self, store: &dyn HistoryStore) -> CoreResult<()> {
        let raw = serde_json::to_string(&self.entries)?;
        store.write(HISTORY_KEY, &raw).await
    }
}

/// String key-value storage for client-side state.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn read(&self, key: &str) -> CoreResult<Option<String>>;

    /// Replace the value stored under `key`.
    async fn write(&self, key: &str, value: &str) -> CoreResult<()>;
}

/// In-memory store.
///
/// Suitable for tests and short-lived sessions; nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct InMemoryHistoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryHistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn read(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> CoreResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
