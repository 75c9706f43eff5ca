//! Cache types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default time-to-live for cached images (7 days)
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default per-download timeout
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Key under which the index is persisted in the key-value store
pub const INDEX_KEY: &str = "IMAGE_CACHE_MAP";

/// Metadata for a cached image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub source_url: String,
    pub local_path: PathBuf,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(source_url: impl Into<String>, local_path: PathBuf) -> Self {
        Self {
            source_url: source_url.into(),
            local_path,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the entry is still inside its TTL window at `now`.
    ///
    /// Timestamps from the future count as age zero. This does not check
    /// that the file is still on disk.
    pub fn is_within_ttl(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let age = now
            .signed_duration_since(self.fetched_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        age < ttl
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub downloads: u64,
    pub failures: u64,
}

/// Configuration for an [`ImageCache`](crate::ImageCache)
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding the downloaded image files
    pub cache_dir: PathBuf,
    /// Entries older than this are re-downloaded
    pub ttl: Duration,
    /// Store key for the persisted index
    pub index_key: String,
}

impl CacheConfig {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./cache/images"),
            ttl: DEFAULT_TTL,
            index_key: INDEX_KEY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.cache_dir, PathBuf::from("./cache/images"));
        assert_eq!(config.ttl, Duration::from_secs(604_800));
        assert_eq!(config.index_key, "IMAGE_CACHE_MAP");
    }

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.downloads, 0);
        assert_eq!(stats.failures, 0);
    }

    #[test]
    fn test_entry_within_ttl() {
        let entry = CacheEntry::new("https://picsum.photos/id/1/300/300", "/tmp/a".into());
        assert!(entry.is_within_ttl(DEFAULT_TTL, Utc::now()));
    }

    #[test]
    fn test_entry_expired() {
        let mut entry = CacheEntry::new("https://picsum.photos/id/1/300/300", "/tmp/a".into());
        entry.fetched_at = Utc::now() - chrono::Duration::days(8);
        assert!(!entry.is_within_ttl(DEFAULT_TTL, Utc::now()));
    }

    #[test]
    fn test_entry_at_exact_ttl_is_expired() {
        let now = Utc::now();
        let mut entry = CacheEntry::new("https://picsum.photos/id/1/300/300", "/tmp/a".into());

        entry.fetched_at = now - chrono::Duration::days(7);
        assert!(!entry.is_within_ttl(DEFAULT_TTL, now));

        entry.fetched_at = now - chrono::Duration::days(7) + chrono::Duration::milliseconds(1);
        assert!(entry.is_within_ttl(DEFAULT_TTL, now));
    }

    #[test]
    fn test_entry_from_future_is_fresh() {
        let mut entry = CacheEntry::new("https://picsum.photos/id/1/300/300", "/tmp/a".into());
        entry.fetched_at = Utc::now() + chrono::Duration::hours(1);
        assert!(entry.is_within_ttl(DEFAULT_TTL, Utc::now()));
    }

    #[test]
    fn test_cache_entry_serialization() {
        let entry = CacheEntry::new("https://picsum.photos/id/10/300/300", "/cache/ab-300".into());

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("sourceUrl"));
        assert!(json.contains("localPath"));
        assert!(json.contains("fetchedAt"));

        let deserialized: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, entry);
    }
}
