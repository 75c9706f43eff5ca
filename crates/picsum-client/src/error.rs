//! Error types for the Picsum API client

use std::fmt;

/// Errors that can occur when interacting with the Picsum API
#[derive(Debug)]
pub enum PicsumError {
    /// HTTP request failed or the body could not be decoded
    Http(reqwest::Error),
    /// The API answered with a non-success status
    Api(String),
    /// Pages are numbered from 1
    InvalidPage(u32),
}

impl fmt::Display for PicsumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Picsum HTTP error: {e}"),
            Self::Api(msg) => write!(f, "Picsum API error: {msg}"),
            Self::InvalidPage(page) => write!(f, "Invalid page number: {page}"),
        }
    }
}

impl std::error::Error for PicsumError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PicsumError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// Result type for Picsum API operations
pub type Result<T> = std::result::Result<T, PicsumError>;
