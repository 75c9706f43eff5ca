//! Data types for Picsum API responses

use serde::{Deserialize, Serialize};

/// One image from `/v2/list`
///
/// `download_url` is the full-size asset and the key used by the image cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Page on unsplash.com
    #[serde(default)]
    pub url: Option<String>,
    pub download_url: String,
}

impl ImageRecord {
    /// Record carrying only what an id can tell us
    pub fn from_id(id: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: String::new(),
            width: None,
            height: None,
            url: None,
            download_url: download_url.into(),
        }
    }
}
