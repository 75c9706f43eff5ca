//! Rust client for the Lorem Picsum image listing API
//!
//! # Example
//!
//! ```no_run
//! use picsum_client::PicsumClient;
//!
//! # async fn example() -> Result<(), picsum_client::PicsumError> {
//! let client = PicsumClient::new()?;
//!
//! for image in client.list(1, 30).await? {
//!     println!("{} by {}", image.download_url, image.author);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - `GET /v2/list?page={n}&limit={m}` - Paged image listing
//! - `/id/{id}/{width}/{height}` - Image rendition URLs (built, not fetched)

mod client;
mod error;
mod types;

pub use client::PicsumClient;
pub use error::{PicsumError, Result};
pub use types::ImageRecord;
