//! Persisted set of favorite image ids

use crate::error::Result;
use image_cache::KeyValueStore;
use picsum_client::{ImageRecord, PicsumClient};
use tracing::{debug, warn};

/// Store key holding the JSON array of favorite ids
pub const FAVORITES_KEY: &str = "favorites";

/// Side length used when rebuilding favorites from ids
const FAVORITE_RENDITION: u32 = 300;

/// Favorite ids in the order they were added
pub struct Favorites<S> {
    store: S,
    ids: Vec<String>,
}

impl<S: KeyValueStore> Favorites<S> {
    /// Load favorites; a missing or corrupt list loads as empty
    pub async fn load(store: S) -> Self {
        let ids = match store.get(FAVORITES_KEY).await {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable favorites");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read favorites");
                Vec::new()
            }
        };
        debug!(count = ids.len(), "Loaded favorites");

        Self { store, ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|f| f == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Flip the favorite state of `id`, returning the new state
    pub async fn toggle(&mut self, id: &str) -> Result<bool> {
        let mut next = self.ids.clone();
        let favorite = if self.contains(id) {
            next.retain(|f| f != id);
            false
        } else {
            next.push(id.to_string());
            true
        };

        self.commit(next).await?;
        Ok(favorite)
    }

    /// Remove `id`, returning whether it was a favorite
    pub async fn remove(&mut self, id: &str) -> Result<bool> {
        if !self.contains(id) {
            return Ok(false);
        }
        let next = self.ids.iter().filter(|f| *f != id).cloned().collect();
        self.commit(next).await?;
        Ok(true)
    }

    /// Persist `next`, then adopt it in memory
    async fn commit(&mut self, next: Vec<String>) -> Result<()> {
        let json = serde_json::to_string(&next).map_err(image_cache::CacheError::from)?;
        self.store.set(FAVORITES_KEY, &json).await?;
        self.ids = next;
        Ok(())
    }

    /// Rebuild displayable records from the stored ids.
    ///
    /// Only the id is persisted, so author and original dimensions are lost
    /// and every record points at a fixed-size rendition.
    pub fn records(&self, client: &PicsumClient) -> Vec<ImageRecord> {
        self.ids
            .iter()
            .map(|id| {
                ImageRecord::from_id(
                    id.clone(),
                    client.thumbnail_url(id, FAVORITE_RENDITION, FAVORITE_RENDITION),
                )
            })
            .collect()
    }
}
