//! Gallery front end: feed, favorites and cached display paths

use crate::config::GalleryConfig;
use crate::error::Result;
use crate::favorites::Favorites;
use crate::feed::Feed;
use futures::stream::{self, StreamExt};
use image_cache::{CacheStats, FileStore, HttpDownloader, ImageCache};
use picsum_client::{ImageRecord, PicsumClient};
use tracing::{info, warn};

/// A record ready to display
#[derive(Debug, Clone)]
pub struct GalleryItem {
    pub record: ImageRecord,
    /// Local file path, or the remote URL if caching failed
    pub display: String,
    pub favorite: bool,
}

impl GalleryItem {
    pub fn is_cached(&self) -> bool {
        self.display != self.record.download_url
    }
}

pub struct Gallery {
    cache: ImageCache,
    feed: Feed,
    favorites: Favorites<FileStore>,
    concurrency: usize,
}

impl Gallery {
    /// Build the gallery from configuration and load persisted state
    pub async fn open(config: &GalleryConfig) -> Result<Self> {
        let store = FileStore::new(&config.data_dir);
        let downloader = HttpDownloader::with_timeout(config.download_timeout())?;
        let cache = ImageCache::new(store.clone(), downloader, config.cache_config());
        cache.init().await?;

        let client = PicsumClient::with_base_url_and_timeout(
            &config.listing_url,
            config.download_timeout(),
        )?;
        let feed = Feed::new(client, config.page_size);
        let favorites = Favorites::load(store).await;

        Ok(Self {
            cache,
            feed,
            favorites,
            concurrency: config.concurrency,
        })
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn favorites(&self) -> &Favorites<FileStore> {
        &self.favorites
    }

    /// Load up to `pages` more pages and resolve every new image.
    ///
    /// A failed page stops loading but keeps what earlier pages returned;
    /// the error is only returned when nothing new was loaded.
    pub async fn browse(&mut self, pages: u32) -> Result<Vec<GalleryItem>> {
        let start = self.feed.images().len();
        for _ in 0..pages {
            match self.feed.load_more().await {
                Ok(0) if self.feed.is_exhausted() => break,
                Ok(_) => {}
                Err(e) if self.feed.images().len() == start => return Err(e.into()),
                Err(e) => {
                    warn!(
                        page = self.feed.next_page(),
                        error = %e,
                        "Stopped browsing early, keeping loaded pages"
                    );
                    break;
                }
            }
        }

        let records = self.feed.images()[start..].to_vec();
        let items = self.resolve_all(records).await;
        info!(
            next_page = self.feed.next_page(),
            count = items.len(),
            cached = items.iter().filter(|i| i.is_cached()).count(),
            "Resolved gallery page"
        );
        Ok(items)
    }

    /// Favorites rebuilt from their ids and resolved through the cache
    pub async fn favorite_items(&self) -> Vec<GalleryItem> {
        let records = self.favorites.records(self.feed.client());
        self.resolve_all(records).await
    }

    /// Flip the favorite state of `id`, returning the new state
    pub async fn toggle_favorite(&mut self, id: &str) -> Result<bool> {
        self.favorites.toggle(id).await
    }

    /// Drop `id` from favorites, returning whether it was one
    pub async fn remove_favorite(&mut self, id: &str) -> Result<bool> {
        self.favorites.remove(id).await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    async fn resolve_all(&self, records: Vec<ImageRecord>) -> Vec<GalleryItem> {
        stream::iter(records)
            .map(|record| async move {
                let display = self.cache.resolve(&record.download_url).await;
                let favorite = self.favorites.contains(&record.id);
                GalleryItem {
                    record,
                    display,
                    favorite,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Json, Response},
        routing::get,
        Router,
    };
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use tempfile::{tempdir, TempDir};

    /// Serves a listing whose images live on the same server; id "bad" 404s
    async fn serve_picsum() -> SocketAddr {
        serve_listing(u32::MAX).await
    }

    /// Like [`serve_picsum`], but listing pages from `fail_from` on return 500
    async fn serve_listing(fail_from: u32) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        async fn list(
            State((base, fail_from)): State<(String, u32)>,
            Query(params): Query<HashMap<String, String>>,
        ) -> Response {
            let page: u32 = params
                .get("page")
                .and_then(|p| p.parse().ok())
                .unwrap_or(0);
            if page >= fail_from {
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
            let ids: &[&str] = match page {
                1 => &["1", "2", "bad"],
                _ => &[],
            };
            let records: Vec<serde_json::Value> = ids
                .iter()
                .map(|id| {
                    serde_json::json!({
                        "id": id,
                        "author": format!("Author {}", id),
                        "download_url": format!("{}/id/{}/300/300", base, id),
                    })
                })
                .collect();
            Json(records).into_response()
        }

        async fn image(Path((id, _w, _h)): Path<(String, u32, u32)>) -> Response {
            if id == "bad" {
                return StatusCode::NOT_FOUND.into_response();
            }
            format!("image {}", id).into_response()
        }

        let router = Router::new()
            .route("/v2/list", get(list))
            .route("/id/{id}/{w}/{h}", get(image))
            .with_state((format!("http://{}", addr), fail_from));
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn config_for(addr: SocketAddr, dir: &TempDir) -> GalleryConfig {
        GalleryConfig {
            cache_dir: dir.path().join("images"),
            data_dir: dir.path().join("data"),
            listing_url: format!("http://{}", addr),
            page_size: 3,
            ..GalleryConfig::default()
        }
    }

    #[tokio::test]
    async fn test_browse_resolves_to_local_files() {
        let addr = serve_picsum().await;
        let dir = tempdir().unwrap();
        let mut gallery = Gallery::open(&config_for(addr, &dir)).await.unwrap();

        let items = gallery.browse(2).await.unwrap();
        assert_eq!(items.len(), 3);
        assert!(gallery.feed().is_exhausted());

        let ids: Vec<&str> = items.iter().map(|i| i.record.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "bad"]);

        assert!(items[0].is_cached());
        assert_eq!(std::fs::read_to_string(&items[0].display).unwrap(), "image 1");
        assert!(items[1].is_cached());

        // Failed download falls back to the remote URL
        assert!(!items[2].is_cached());
        assert_eq!(items[2].display, items[2].record.download_url);

        let stats = gallery.stats().await;
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.failures, 1);
    }

    #[tokio::test]
    async fn test_failed_later_page_keeps_loaded_items() {
        let addr = serve_listing(2).await;
        let dir = tempdir().unwrap();
        let mut gallery = Gallery::open(&config_for(addr, &dir)).await.unwrap();

        let items = gallery.browse(2).await.unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.record.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "bad"]);
        assert!(items[0].is_cached());
        assert_eq!(gallery.feed().next_page(), 2);
        assert!(!gallery.feed().is_exhausted());
    }

    #[tokio::test]
    async fn test_failed_first_page_is_an_error() {
        let addr = serve_listing(1).await;
        let dir = tempdir().unwrap();
        let mut gallery = Gallery::open(&config_for(addr, &dir)).await.unwrap();

        assert!(matches!(
            gallery.browse(2).await,
            Err(crate::error::GalleryError::Client(_))
        ));
        assert!(gallery.feed().images().is_empty());
    }

    #[tokio::test]
    async fn test_index_persists_between_sessions() {
        let addr = serve_picsum().await;
        let dir = tempdir().unwrap();
        let config = config_for(addr, &dir);

        let first = Gallery::open(&config)
            .await
            .unwrap()
            .browse(1)
            .await
            .unwrap();

        let mut gallery = Gallery::open(&config).await.unwrap();
        let second = gallery.browse(1).await.unwrap();

        assert_eq!(first[0].display, second[0].display);
        let stats = gallery.stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.downloads, 0);
    }

    #[tokio::test]
    async fn test_favorites_marked_and_listed() {
        let addr = serve_picsum().await;
        let dir = tempdir().unwrap();
        let mut gallery = Gallery::open(&config_for(addr, &dir)).await.unwrap();

        assert!(gallery.toggle_favorite("2").await.unwrap());
        let items = gallery.browse(1).await.unwrap();
        assert!(!items[0].favorite);
        assert!(items[1].favorite);

        let favorites = gallery.favorite_items().await;
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].record.id, "2");
        assert!(favorites[0].favorite);
        assert!(favorites[0].is_cached());
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let addr = serve_picsum().await;
        let dir = tempdir().unwrap();
        let mut gallery = Gallery::open(&config_for(addr, &dir)).await.unwrap();

        let items = gallery.browse(1).await.unwrap();
        gallery.clear_cache().await;

        assert_eq!(gallery.stats().await.entries, 0);
        assert!(!std::path::Path::new(&items[0].display).exists());
    }
}
