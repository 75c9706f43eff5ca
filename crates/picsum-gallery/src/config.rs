use image_cache::CacheConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Gallery configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub cache_dir: PathBuf,
    pub data_dir: PathBuf,
    pub listing_url: String,
    pub page_size: u32,
    pub cache_ttl_secs: u64,
    pub download_timeout_secs: u64,
    pub concurrency: usize,
}

impl GalleryConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let cache_dir = get("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);

        let data_dir = get("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let listing_url = get("LISTING_URL").unwrap_or(defaults.listing_url);

        let page_size = get("PAGE_SIZE")
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.page_size);

        let cache_ttl_secs = get("CACHE_TTL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.cache_ttl_secs);

        let download_timeout_secs = get("DOWNLOAD_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.download_timeout_secs);

        let concurrency = get("DOWNLOAD_CONCURRENCY")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.concurrency);

        Self {
            cache_dir,
            data_dir,
            listing_url,
            page_size,
            cache_ttl_secs,
            download_timeout_secs,
            concurrency,
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(&self.cache_dir).with_ttl(Duration::from_secs(self.cache_ttl_secs))
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./cache/images"),
            data_dir: PathBuf::from("./data"),
            listing_url: "https://picsum.photos".to_string(),
            page_size: 20,
            cache_ttl_secs: 7 * 24 * 60 * 60, // 7 days
            download_timeout_secs: 30,
            concurrency: 8,
        }
    }
}
