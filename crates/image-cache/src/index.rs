//! Persisted mapping from source URL to cached file

use crate::error::{CacheError, Result};
use crate::store::KeyValueStore;
use crate::types::CacheEntry;
use std::collections::HashMap;
use tracing::{debug, warn};

/// URL -> [`CacheEntry`] map, serialized as one JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheIndex {
    entries: HashMap<String, CacheEntry>,
}

impl CacheIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index stored under `key`.
    ///
    /// A missing, unreadable or corrupt blob yields an empty index.
    pub async fn load<S: KeyValueStore>(store: &S, key: &str) -> Self {
        match Self::try_load(store, key).await {
            Ok(index) => {
                debug!(key, entries = index.len(), "Loaded cache index");
                index
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable cache index");
                Self::new()
            }
        }
    }

    async fn try_load<S: KeyValueStore>(store: &S, key: &str) -> Result<Self> {
        let raw = store
            .get(key)
            .await
            .map_err(|e| CacheError::PersistenceRead(e.to_string()))?;

        let Some(raw) = raw else {
            return Ok(Self::new());
        };

        let entries: HashMap<String, CacheEntry> = serde_json::from_str(&raw)
            .map_err(|e| CacheError::PersistenceRead(e.to_string()))?;
        Ok(Self { entries })
    }

    /// Write the whole index under `key`
    pub async fn save<S: KeyValueStore>(&self, store: &S, key: &str) -> Result<()> {
        let json = serde_json::to_string(&self.entries)
            .map_err(|e| CacheError::PersistenceWrite(e.to_string()))?;
        store
            .set(key, &json)
            .await
            .map_err(|e| CacheError::PersistenceWrite(e.to_string()))
    }

    /// Delete the persisted blob under `key`
    pub async fn remove_persisted<S: KeyValueStore>(store: &S, key: &str) -> Result<()> {
        store
            .remove(key)
            .await
            .map_err(|e| CacheError::PersistenceWrite(e.to_string()))
    }

    pub fn get(&self, url: &str) -> Option<&CacheEntry> {
        self.entries.get(url)
    }

    /// Insert or replace the entry for its source URL.
    ///
    /// `fetched_at` never moves backwards for a key.
    pub fn upsert(&mut self, mut entry: CacheEntry) {
        if let Some(previous) = self.entries.get(&entry.source_url) {
            entry.fetched_at = entry.fetched_at.max(previous.fetched_at);
        }
        self.entries.insert(entry.source_url.clone(), entry);
    }

    /// Remove every entry, returning them
    pub fn drain(&mut self) -> Vec<CacheEntry> {
        self.entries.drain().map(|(_, entry)| entry).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};
    use std::path::PathBuf;

    const KEY: &str = "IMAGE_CACHE_MAP";

    fn entry(url: &str) -> CacheEntry {
        CacheEntry::new(url, PathBuf::from(format!("/cache/{}", url.len())))
    }

    #[tokio::test]
    async fn test_load_absent_is_empty() {
        let store = MemoryStore::new();
        let index = CacheIndex::load(&store, KEY).await;
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_is_empty() {
        let store = MemoryStore::new();
        store.set(KEY, "{not json").await.unwrap();

        let index = CacheIndex::load(&store, KEY).await;
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = MemoryStore::new();
        let mut index = CacheIndex::new();
        index.upsert(entry("https://picsum.photos/id/1/300/300"));
        index.upsert(entry("https://picsum.photos/id/2/300/300"));

        index.save(&store, KEY).await.unwrap();

        let loaded = CacheIndex::load(&store, KEY).await;
        assert_eq!(loaded, index);
        assert_eq!(loaded.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_persisted() {
        let store = MemoryStore::new();
        let mut index = CacheIndex::new();
        index.upsert(entry("https://picsum.photos/id/1/300/300"));
        index.save(&store, KEY).await.unwrap();

        CacheIndex::remove_persisted(&store, KEY).await.unwrap();
        assert!(store.get(KEY).await.unwrap().is_none());
    }

    #[test]
    fn test_upsert_never_regresses_timestamp() {
        let url = "https://picsum.photos/id/1/300/300";
        let mut index = CacheIndex::new();

        let mut newer = entry(url);
        newer.fetched_at = Utc::now() + Duration::hours(2);
        let newer_ts = newer.fetched_at;
        index.upsert(newer);

        index.upsert(entry(url));
        assert_eq!(index.get(url).unwrap().fetched_at, newer_ts);
    }

    #[test]
    fn test_upsert_replaces_path() {
        let url = "https://picsum.photos/id/1/300/300";
        let mut index = CacheIndex::new();
        index.upsert(entry(url));
        index.upsert(CacheEntry::new(url, PathBuf::from("/cache/other")));

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(url).unwrap().local_path, PathBuf::from("/cache/other"));
    }

    #[test]
    fn test_drain() {
        let mut index = CacheIndex::new();
        index.upsert(entry("https://a.example/1"));
        index.upsert(entry("https://a.example/22"));

        let drained = index.drain();
        assert_eq!(drained.len(), 2);
        assert!(index.is_empty());
    }
}
