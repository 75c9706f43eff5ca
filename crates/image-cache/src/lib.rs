//! Persistent image cache keyed by remote URL
//!
//! Maps remote image URLs to downloaded local files. A JSON index of
//! `URL -> {local path, fetch time}` is kept in memory and written back to a
//! [`KeyValueStore`] after every change. Entries older than the TTL (7 days
//! by default) or whose file has vanished are downloaded again. Failures
//! never reach the caller: a failed download resolves to the original URL.
//!
//! # Example
//!
//! ```no_run
//! use image_cache::{CacheConfig, FileStore, HttpDownloader, ImageCache};
//!
//! # async fn example() -> Result<(), image_cache::CacheError> {
//! let cache = ImageCache::new(
//!     FileStore::new("./data"),
//!     HttpDownloader::new()?,
//!     CacheConfig::new("./cache/images"),
//! );
//! cache.init().await?;
//!
//! let path = cache.resolve("https://picsum.photos/id/10/300/300").await;
//! println!("display {}", path);
//! # Ok(())
//! # }
//! ```

mod cache;
mod error;
mod fetcher;
mod filename;
mod index;
mod store;
mod types;

pub use cache::ImageCache;
pub use error::{CacheError, Result};
pub use fetcher::{Downloader, HttpDownloader};
pub use filename::cache_filename;
pub use index::CacheIndex;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use types::{
    CacheConfig, CacheEntry, CacheStats, DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_TTL, INDEX_KEY,
};
