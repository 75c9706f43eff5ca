//! Error types for the Picsum gallery

use std::fmt;

#[derive(Debug)]
pub enum GalleryError {
    Client(picsum_client::PicsumError),
    Cache(image_cache::CacheError),
    Config(String),
    Usage(String),
}

impl fmt::Display for GalleryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GalleryError::Client(err) => write!(f, "Listing error: {}", err),
            GalleryError::Cache(err) => write!(f, "Storage error: {}", err),
            GalleryError::Config(msg) => write!(f, "Configuration error: {}", msg),
            GalleryError::Usage(msg) => write!(f, "Usage error: {}", msg),
        }
    }
}

impl std::error::Error for GalleryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GalleryError::Client(err) => Some(err),
            GalleryError::Cache(err) => Some(err),
            _ => None,
        }
    }
}

impl From<picsum_client::PicsumError> for GalleryError {
    fn from(err: picsum_client::PicsumError) -> Self {
        GalleryError::Client(err)
    }
}

impl From<image_cache::CacheError> for GalleryError {
    fn from(err: image_cache::CacheError) -> Self {
        GalleryError::Cache(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for GalleryError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        GalleryError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;
