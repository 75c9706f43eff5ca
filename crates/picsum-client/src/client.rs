//! Picsum API HTTP client

use crate::error::{PicsumError, Result};
use crate::types::ImageRecord;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://picsum.photos";
const DEFAULT_USER_AGENT: &str = "picsum-client-rs/0.1";
const PAGE_CACHE_TTL_SECS: u64 = 300; // 5 minutes
const MAX_PAGE_SIZE: u32 = 100;

/// Client for the Lorem Picsum listing API
///
/// Listing pages are cached in memory for a few minutes so scrolling back
/// and forth does not hit the API again.
pub struct PicsumClient {
    http: reqwest::Client,
    base_url: String,
    pages: Cache<(u32, u32), Arc<Vec<ImageRecord>>>,
}

impl PicsumClient {
    /// Create a new client with default settings (30 second timeout)
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new client against a custom API host
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::with_base_url_and_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a new client with a custom host and request timeout
    pub fn with_base_url_and_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        let pages = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(Duration::from_secs(PAGE_CACHE_TTL_SECS))
            .build();

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            pages,
        })
    }

    /// Fetch one page of the image listing
    ///
    /// # Arguments
    /// * `page` - 1-based page number
    /// * `limit` - Page size, clamped to 1..=100
    pub async fn list(&self, page: u32, limit: u32) -> Result<Vec<ImageRecord>> {
        if page == 0 {
            return Err(PicsumError::InvalidPage(page));
        }
        let limit = limit.clamp(1, MAX_PAGE_SIZE);

        if let Some(cached) = self.pages.get(&(page, limit)).await {
            debug!(page, limit, "Listing page served from cache");
            return Ok(cached.as_ref().clone());
        }

        let url = format!("{}/v2/list?page={}&limit={}", self.base_url, page, limit);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Failed to fetch listing page");
            return Err(PicsumError::Api(format!(
                "listing returned status {}",
                response.status()
            )));
        }

        let records: Vec<ImageRecord> = response.json().await?;
        debug!(page, limit, count = records.len(), "Fetched listing page");

        self.pages
            .insert((page, limit), Arc::new(records.clone()))
            .await;
        Ok(records)
    }

    /// Drop all cached listing pages
    pub fn invalidate_pages(&self) {
        self.pages.invalidate_all();
    }

    /// URL of a square-cropped rendition of image `id`
    pub fn thumbnail_url(&self, id: &str, width: u32, height: u32) -> String {
        format!("{}/id/{}/{}/{}", self.base_url, id, width, height)
    }
}
