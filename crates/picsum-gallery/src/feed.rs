//! Infinite-scroll feed over the listing API

use picsum_client::{ImageRecord, PicsumClient};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Accumulates listing pages as the user scrolls
pub struct Feed {
    client: PicsumClient,
    images: Vec<ImageRecord>,
    seen: HashSet<String>,
    next_page: u32,
    page_size: u32,
    exhausted: bool,
}

impl Feed {
    pub fn new(client: PicsumClient, page_size: u32) -> Self {
        Self {
            client,
            images: Vec::new(),
            seen: HashSet::new(),
            next_page: 1,
            page_size,
            exhausted: false,
        }
    }

    pub fn client(&self) -> &PicsumClient {
        &self.client
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    /// True once the API returned an empty page
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetch the next page and append its images.
    ///
    /// Returns how many new images were appended. Ids already in the feed
    /// are skipped. A failed fetch leaves the page counter where it was.
    pub async fn load_more(&mut self) -> picsum_client::Result<usize> {
        if self.exhausted {
            return Ok(0);
        }

        let page = self.next_page;
        let records = match self.client.list(page, self.page_size).await {
            Ok(records) => records,
            Err(e) => {
                warn!(page, error = %e, "Failed to load listing page");
                return Err(e);
            }
        };

        if records.is_empty() {
            info!(page, "Reached end of listing");
            self.exhausted = true;
            return Ok(0);
        }

        let before = self.images.len();
        for record in records {
            if self.seen.insert(record.id.clone()) {
                self.images.push(record);
            }
        }
        self.next_page += 1;

        let appended = self.images.len() - before;
        debug!(page, appended, total = self.images.len(), "Loaded listing page");
        Ok(appended)
    }
}
