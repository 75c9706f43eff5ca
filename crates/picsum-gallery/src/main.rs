//! Picsum Gallery - browse Lorem Picsum from the terminal
//!
//! Pages through the listing API, keeps downloaded images in a local cache
//! and remembers favorites between runs.

mod config;
mod error;
mod favorites;
mod feed;
mod gallery;

use crate::config::GalleryConfig;
use crate::error::{GalleryError, Result};
use crate::gallery::{Gallery, GalleryItem};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

/// A command line request
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Load this many pages and print display paths
    Browse(u32),
    Favorites,
    Favorite(String),
    Unfavorite(String),
    Clear,
    Stats,
}

impl Command {
    fn parse(args: &[String]) -> Result<Self> {
        let mut args = args.iter().map(String::as_str);
        let command = match args.next() {
            None | Some("browse") => {
                let pages = match args.next() {
                    Some(n) => n
                        .parse::<u32>()
                        .ok()
                        .filter(|&n| n > 0)
                        .ok_or_else(|| {
                            GalleryError::Usage(format!("invalid page count: {}", n))
                        })?,
                    None => 1,
                };
                Command::Browse(pages)
            }
            Some("favorites") => Command::Favorites,
            Some("favorite") => {
                let id = args
                    .next()
                    .ok_or_else(|| GalleryError::Usage("favorite needs an image id".to_string()))?;
                Command::Favorite(id.to_string())
            }
            Some("unfavorite") => {
                let id = args.next().ok_or_else(|| {
                    GalleryError::Usage("unfavorite needs an image id".to_string())
                })?;
                Command::Unfavorite(id.to_string())
            }
            Some("clear") => Command::Clear,
            Some("stats") => Command::Stats,
            Some(other) => {
                return Err(GalleryError::Usage(format!("unknown command: {}", other)));
            }
        };

        if let Some(extra) = args.next() {
            return Err(GalleryError::Usage(format!("unexpected argument: {}", extra)));
        }
        Ok(command)
    }
}

fn print_items(items: &[GalleryItem]) {
    for item in items {
        let marker = if item.favorite { "*" } else { "-" };
        println!(
            "{}\t{}\t{}\t{}",
            item.record.id, item.record.author, marker, item.display
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env()
        .add_directive("picsum_gallery=info".parse()?)
        .add_directive("image_cache=info".parse()?);

    // Use JSON format for Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let config = GalleryConfig::from_env();
    info!("Cache dir: {:?}", config.cache_dir);
    info!("Data dir: {:?}", config.data_dir);
    info!("Cache TTL: {} seconds", config.cache_ttl_secs);

    let mut gallery = Gallery::open(&config).await?;

    match command {
        Command::Browse(pages) => {
            let items = gallery.browse(pages).await?;
            print_items(&items);
            if gallery.feed().is_exhausted() {
                eprintln!("end of listing");
            }
        }
        Command::Favorites => {
            if gallery.favorites().is_empty() {
                println!("no favorites");
            } else {
                let items = gallery.favorite_items().await;
                print_items(&items);
            }
        }
        Command::Favorite(id) => {
            let favorite = gallery.toggle_favorite(&id).await?;
            println!("{}\t{}", id, if favorite { "favorited" } else { "unfavorited" });
        }
        Command::Unfavorite(id) => {
            let removed = gallery.remove_favorite(&id).await?;
            println!("{}\t{}", id, if removed { "unfavorited" } else { "not a favorite" });
        }
        Command::Clear => {
            gallery.clear_cache().await;
            println!("cache cleared");
        }
        Command::Stats => {
            let stats = gallery.stats().await;
            println!("entries\t{}", stats.entries);
            println!("favorites\t{}", gallery.favorites().len());
        }
    }

    Ok(())
}
