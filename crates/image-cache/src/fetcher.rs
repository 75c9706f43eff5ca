//! Remote image download

use crate::error::{CacheError, Result};
use crate::types::DEFAULT_DOWNLOAD_TIMEOUT;
use reqwest::Client;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const USER_AGENT: &str = "image-cache/0.1";

/// Fetches remote bytes into a local file
pub trait Downloader: Send + Sync {
    /// Download `url` into `dest`, returning the number of bytes written.
    ///
    /// On error `dest` is left untouched.
    fn download(&self, url: &str, dest: &Path) -> impl Future<Output = Result<u64>> + Send;
}

impl<T: Downloader> Downloader for Arc<T> {
    fn download(&self, url: &str, dest: &Path) -> impl Future<Output = Result<u64>> + Send {
        (**self).download(url, dest)
    }
}

/// HTTP client for fetching images
pub struct HttpDownloader {
    client: Client,
    timeout: Duration,
}

impl HttpDownloader {
    /// Create a downloader with the default 30 second timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_DOWNLOAD_TIMEOUT)
    }

    /// Create a downloader with a custom per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, timeout })
    }

    fn classify(&self, err: reqwest::Error) -> CacheError {
        if err.is_timeout() {
            CacheError::Timeout(self.timeout)
        } else {
            err.into()
        }
    }

    async fn stream_to(&self, response: &mut reqwest::Response, path: &Path) -> Result<u64> {
        let mut file = fs::File::create(path).await?;
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        debug!(url = %url, dest = ?dest, "Downloading image");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Failed to download image");
            return Err(CacheError::Download(format!(
                "server returned status {}",
                response.status()
            )));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Stream into a sibling file so a broken transfer never lands at `dest`
        let partial = PartialFile::new(dest);
        let written = self.stream_to(&mut response, &partial.path).await?;
        partial.persist(dest).await?;

        debug!(url = %url, size = written, "Downloaded image");
        Ok(written)
    }
}

/// In-progress download file, removed on drop unless persisted.
///
/// Covers errors and a download future dropped mid-transfer.
struct PartialFile {
    path: PathBuf,
    persisted: bool,
}

impl PartialFile {
    fn new(dest: &Path) -> Self {
        Self {
            path: partial_path(dest),
            persisted: false,
        }
    }

    async fn persist(mut self, dest: &Path) -> Result<()> {
        fs::rename(&self.path, dest).await?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = ?self.path, "Removed partial download"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = ?self.path, error = %e, "Failed to remove partial download"),
        }
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
