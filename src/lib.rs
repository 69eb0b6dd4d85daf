//! # listing-dl
//!
//! Library for mirroring photos referenced by a paginated listing API into
//! a local directory, with failure journaling and replay.
//!
//! ## Design Philosophy
//!
//! listing-dl is designed to be:
//! - **Fail-fast on the source** - listing-endpoint unavailability aborts
//!   the run after a bounded retry window
//! - **Never lose a failing URL** - every failed photo download is
//!   journaled and replayed on the next run, without re-querying the
//!   listing API
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - consumers subscribe to progress events, no polling
//!   required
//!
//! ## Quick Start
//!
//! ```no_run
//! use listing_dl::{Config, ListingDownloader};
//! use listing_dl::config::ListingConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         listing: ListingConfig {
//!             base_url: "https://api.example.com/houses".to_string(),
//!             pages: 10,
//!             per_page: 10,
//!         },
//!         ..Default::default()
//!     };
//!
//!     let downloader = ListingDownloader::new(config).await?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let report = downloader.run().await?;
//!     println!(
//!         "total={} missing={} failed={}",
//!         report.total_records, report.missing_photo_url, report.failed
//!     );
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Per-page fan-out of photo downloads
pub mod dispatcher;
/// Run orchestration (mode selection, page loop, statistics)
pub mod downloader;
/// Error types
pub mod error;
/// Failure journal persistence and replay trigger
pub mod journal;
/// Paginated listing-endpoint client
pub mod listing;
/// Per-record photo download worker
pub mod photo;
/// Retry logic with fixed-interval backoff
pub mod retry;
/// Output store abstraction
pub mod store;
/// Core types and events
pub mod types;
/// Output naming helpers
pub mod utils;

// Re-export commonly used types
pub use config::{Config, DownloadConfig, ListingConfig, RetryConfig};
pub use dispatcher::{BatchOutcome, Dispatcher};
pub use downloader::ListingDownloader;
pub use error::{DownloadError, Error, JournalError, ListingError, Result};
pub use journal::FailureJournal;
pub use listing::ListingClient;
pub use store::{FsPhotoStore, PhotoStore};
pub use types::{Event, FailureMap, PageResponse, Record, RunMode, RunReport};
