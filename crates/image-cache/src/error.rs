//! Error types for the image cache

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
pub enum CacheError {
    /// The persisted index could not be read or parsed
    PersistenceRead(String),
    /// The persisted index could not be written
    PersistenceWrite(String),
    /// The remote server answered with a non-success status
    Download(String),
    /// The transfer did not finish within the configured timeout
    Timeout(Duration),
    /// A cached file could not be removed during a clear
    Deletion {
        path: PathBuf,
        source: Box<std::io::Error>,
    },
    Http(Box<reqwest::Error>),
    Io(Box<std::io::Error>),
    Json(serde_json::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::PersistenceRead(msg) => write!(f, "Index read error: {}", msg),
            CacheError::PersistenceWrite(msg) => write!(f, "Index write error: {}", msg),
            CacheError::Download(msg) => write!(f, "Download error: {}", msg),
            CacheError::Timeout(after) => {
                write!(f, "Download timed out after {}s", after.as_secs())
            }
            CacheError::Deletion { path, source } => {
                write!(f, "Failed to delete {}: {}", path.display(), source)
            }
            CacheError::Http(err) => write!(f, "HTTP error: {}", err),
            CacheError::Io(err) => write!(f, "IO error: {}", err),
            CacheError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Deletion { source, .. } => Some(source.as_ref()),
            CacheError::Http(err) => Some(err.as_ref()),
            CacheError::Io(err) => Some(err.as_ref()),
            CacheError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Http(Box::new(err))
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Json(err)
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_download_error_display() {
        let err = CacheError::Download("server returned 404 Not Found".to_string());
        assert_eq!(
            format!("{}", err),
            "Download error: server returned 404 Not Found"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = CacheError::Timeout(Duration::from_secs(30));
        assert_eq!(format!("{}", err), "Download timed out after 30s");
    }

    #[test]
    fn test_deletion_error_has_source() {
        let err = CacheError::Deletion {
            path: PathBuf::from("/cache/abc-300"),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )),
        };
        assert!(format!("{}", err).contains("/cache/abc-300"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_conversion() {
        let err: CacheError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CacheError::Io(_)));
    }
}
