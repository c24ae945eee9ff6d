//! File-backed history store.
//!
//! All keys live in one JSON object on disk. Writes go to a sibling
//! temporary file first and are renamed into place.

use async_trait::async_trait;
use plastfinder_core::{CoreError, CoreResult, HistoryStore};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Stores values in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    /// Store backed by `path`; the file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_map(&self) -> CoreResult<Map<String, Value>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring unreadable history file"
                );
                Ok(Map::new())
            }
        }
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn read(&self, key: &str) -> CoreResult<Option<String>> {
        let map = self.load_map().await?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    async fn write(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut map = self.load_map().await?;
        map.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let contents = serde_json::to_vec_pretty(&map)?;
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CoreError::storage(format!("replacing {}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use plastfinder_core::{SearchCriteria, SearchHistory, HISTORY_KEY};
    use pretty_assertions::assert_eq;

    mock! {
        Store {}

        #[async_trait]
        impl HistoryStore for Store {
            async fn read(&self, key: &str) -> CoreResult<Option<String>>;
            async fn write(&self, key: &str, value: &str) -> CoreResult<()>;
        }
    }

    #[tokio::test]
    async fn test_roundtrip_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path().join("nested/plastfinder/history.json"));

        assert_eq!(store.read(HISTORY_KEY).await.unwrap(), None);
        store.write(HISTORY_KEY, "[]").await.unwrap();
        store.write("other", "x").await.unwrap();

        assert_eq!(store.read(HISTORY_KEY).await.unwrap().as_deref(), Some("[]"));
        assert_eq!(store.read("other").await.unwrap().as_deref(), Some("x"));
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_history_persists_across_stores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = SearchHistory::new();
        history.record(&SearchCriteria::default());
        history.save(&FileHistoryStore::new(&path)).await.unwrap();

        let loaded = SearchHistory::load(&FileHistoryStore::new(&path)).await.unwrap();
        assert_eq!(loaded, history);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        tokio::fs::write(&path, "{oops").await.unwrap();

        let store = FileHistoryStore::new(&path);
        assert_eq!(store.read(HISTORY_KEY).await.unwrap(), None);

        store.write(HISTORY_KEY, "[]").await.unwrap();
        assert_eq!(store.read(HISTORY_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_save_propagates_store_failure() {
        let mut store = MockStore::new();
        store
            .expect_write()
            .withf(|key, _| key.to_string() == HISTORY_KEY)
            .times(1)
            .returning(|_, _| Err(CoreError::storage("disk full")));

        let mut history = SearchHistory::new();
        history.record(&SearchCriteria::default());
        let err = history.save(&store).await.unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn test_load_falls_back_on_bad_value() {
        let mut store = MockStore::new();
        store
            .expect_read()
            .returning(|_| Ok(Some("not a list".to_string())));

        let history = SearchHistory::load(&store).await.unwrap();
        assert!(history.is_empty());
    }
}
