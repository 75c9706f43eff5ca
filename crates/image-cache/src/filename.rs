//! Local file names for cached images

use chrono::Utc;
use sha2::{Digest, Sha256};
use url::Url;

const MAX_SEGMENT_LEN: usize = 96;

/// Build the cache file name for `url`.
///
/// The name is a short digest of the full URL followed by the URL's last
/// path segment, e.g. `https://picsum.photos/id/10/300/300` becomes
/// `<digest>-300`. URLs without a usable last segment get a millisecond
/// timestamp instead of the segment.
pub fn cache_filename(url: &str) -> String {
    let digest = url_digest(url);
    match last_segment(url) {
        Some(segment) => format!("{}-{}", digest, segment),
        None => format!("{}-{}", digest, Utc::now().timestamp_millis()),
    }
}

/// First 6 bytes of SHA-256, hex encoded
fn url_digest(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(&hasher.finalize()[..6])
}

fn last_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;

    let clean: String = segment
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .take(MAX_SEGMENT_LEN)
        .collect();

    if clean.is_empty() || clean.chars().all(|c| c == '.') {
        return None;
    }
    Some(clean)
}
