//! URL-to-file image cache with a persisted index

use crate::error::{CacheError, Result};
use crate::fetcher::{Downloader, HttpDownloader};
use crate::filename::cache_filename;
use crate::index::CacheIndex;
use crate::store::{FileStore, KeyValueStore};
use crate::types::{CacheConfig, CacheEntry, CacheStats};
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, info, warn};

/// Resolves remote image URLs to local files, downloading on a miss.
///
/// The index is loaded from the store on first use and written back in full
/// after every change. Concurrent calls for the same URL share one download.
pub struct ImageCache<S = FileStore, D = HttpDownloader> {
    store: S,
    downloader: D,
    config: CacheConfig,
    /// In-memory index, loaded lazily
    index: OnceCell<RwLock<CacheIndex>>,
    /// Serializes index writes
    persist_lock: Mutex<()>,
    /// Per-URL locks for downloads in progress
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    downloads: AtomicU64,
    failures: AtomicU64,
}

impl<S: KeyValueStore, D: Downloader> ImageCache<S, D> {
    /// Create a new image cache
    pub fn new(store: S, downloader: D, config: CacheConfig) -> Self {
        Self {
            store,
            downloader,
            config,
            index: OnceCell::new(),
            persist_lock: Mutex::new(()),
            in_flight: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            downloads: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Ensure the cache directory exists and the index is loaded
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.config.cache_dir).await?;
        let entries = self.index().await.read().await.len();
        info!(cache_dir = ?self.config.cache_dir, entries, "Image cache initialized");
        Ok(())
    }

    async fn index(&self) -> &RwLock<CacheIndex> {
        self.index
            .get_or_init(|| async {
                RwLock::new(CacheIndex::load(&self.store, &self.config.index_key).await)
            })
            .await
    }

    /// Resolve `url` to a displayable location.
    ///
    /// Returns the local file path on a hit or after a successful download.
    /// If the download fails the original URL is returned unchanged.
    pub async fn resolve(&self, url: &str) -> String {
        if let Some(path) = self.lookup_fresh(url).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(url = %url, "Cache hit");
            return path;
        }

        let key_lock = self.acquire_key(url).await;
        let resolved = {
            let _guard = key_lock.lock().await;
            // Another caller may have populated the entry while we waited
            match self.lookup_fresh(url).await {
                Some(path) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(url = %url, "Cache hit after waiting on in-flight download");
                    path
                }
                None => self.populate(url).await,
            }
        };
        self.release_key(url, key_lock).await;

        resolved
    }

    /// Path of a fresh entry whose file is still on disk
    async fn lookup_fresh(&self, url: &str) -> Option<String> {
        let entry = {
            let index = self.index().await.read().await;
            index.get(url).cloned()
        }?;

        if !entry.is_within_ttl(self.config.ttl, Utc::now()) {
            debug!(url = %url, fetched_at = %entry.fetched_at, "Cache entry expired");
            return None;
        }

        match fs::try_exists(&entry.local_path).await {
            Ok(true) => Some(entry.local_path.to_string_lossy().into_owned()),
            Ok(false) => {
                debug!(url = %url, path = ?entry.local_path, "Cached file missing");
                None
            }
            Err(e) => {
                warn!(url = %url, path = ?entry.local_path, error = %e, "Failed to check cached file");
                None
            }
        }
    }

    /// Download `url` and record it, falling back to the URL on failure
    async fn populate(&self, url: &str) -> String {
        self.misses.fetch_add(1, Ordering::Relaxed);

        let path = self.config.cache_dir.join(cache_filename(url));
        let downloaded = match fs::create_dir_all(&self.config.cache_dir).await {
            Ok(()) => self.downloader.download(url, &path).await,
            Err(e) => Err(e.into()),
        };

        let size = match downloaded {
            Ok(size) => size,
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(url = %url, error = %e, "Failed to cache image, using remote URL");
                return url.to_string();
            }
        };
        self.downloads.fetch_add(1, Ordering::Relaxed);

        let replaced = {
            let mut index = self.index().await.write().await;
            let previous = index.get(url).map(|e| e.local_path.clone());
            index.upsert(CacheEntry::new(url, path.clone()));
            previous
        };

        // The fallback name is not stable across downloads; drop the old file
        if let Some(old) = replaced.filter(|old| *old != path) {
            if let Err(e) = remove_cached_file(&old).await {
                warn!(url = %url, error = %e, "Failed to remove superseded cache file");
            }
        }

        self.persist().await;
        debug!(url = %url, path = ?path, size, "Cached image");

        path.to_string_lossy().into_owned()
    }

    /// Write the full index; failures are logged and in-memory state kept
    async fn persist(&self) {
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.index().await.read().await.clone();

        if let Err(e) = snapshot.save(&self.store, &self.config.index_key).await {
            warn!(error = %e, entries = snapshot.len(), "Failed to persist cache index");
        }
    }

    async fn acquire_key(&self, url: &str) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        in_flight.entry(url.to_string()).or_default().clone()
    }

    async fn release_key(&self, url: &str, key_lock: Arc<Mutex<()>>) {
        drop(key_lock);
        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(url)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            in_flight.remove(url);
        }
    }

    /// Delete every cached file and the persisted index.
    ///
    /// Per-file failures are logged and skipped.
    pub async fn clear(&self) {
        let _guard = self.persist_lock.lock().await;
        let entries = self.index().await.write().await.drain();

        let mut failed = 0usize;
        for entry in &entries {
            if let Err(e) = remove_cached_file(&entry.local_path).await {
                failed += 1;
                warn!(url = %entry.source_url, error = %e, "Failed to delete cached image");
            }
        }

        if let Err(e) = CacheIndex::remove_persisted(&self.store, &self.config.index_key).await {
            warn!(error = %e, "Failed to remove persisted cache index");
        }

        info!(
            removed = entries.len() - failed,
            failed, "Cleared image cache"
        );
    }

    /// Current entry for `url`, fresh or not
    pub async fn entry(&self, url: &str) -> Option<CacheEntry> {
        self.index().await.read().await.get(url).cloned()
    }

    pub async fn len(&self) -> usize {
        self.index().await.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Get current cache statistics
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            downloads: self.downloads.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Remove a cached file; a file that is already gone is not an error
async fn remove_cached_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::Deletion {
            path: path.to_path_buf(),
            source: Box::new(e),
        }),
    }
}
