//! Basic mirror example
//!
//! This example demonstrates the core functionality of listing-dl:
//! - Configuring the listing endpoint and output directory
//! - Creating a downloader instance
//! - Subscribing to events
//! - Running one mirror pass (normal or recovery, decided by the journal)
//!
//! The process exits 0 on normal completion (including completion with
//! journaled failures) and non-zero when the listing endpoint stays
//! unavailable past the retry ceiling.

use listing_dl::config::{Config, DownloadConfig, ListingConfig};
use listing_dl::{Event, ListingDownloader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    // Build configuration
    let config = Config {
        listing: ListingConfig {
            base_url: "https://api.example.com/houses".to_string(),
            pages: 10,
            per_page: 10,
        },
        download: DownloadConfig {
            output_dir: "photos".into(),
            ..Default::default()
        },
        ..Default::default()
    };

    // Create downloader instance
    let downloader = ListingDownloader::new(config).await?;

    // Subscribe to events
    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::PageFetched { page, records } => {
                    println!("✓ Page {page}: {records} records");
                }
                Event::PhotoSkipped { id, address } => {
                    println!("- Skipped #{id} ({address}): no photo URL");
                }
                Event::PhotoDownloaded { output_name, bytes } => {
                    println!("⬇ {output_name} ({bytes} bytes)");
                }
                Event::PhotoFailed {
                    output_name, error, ..
                } => {
                    println!("✗ {output_name}: {error}");
                }
                Event::RunComplete { .. } => {}
            }
        }
    });

    // One run: replays the journal if one exists, paginates otherwise
    let report = downloader.run().await?;

    println!(
        "{} run finished in {:.2}s: total={} missing_photo_url={} downloaded={} failed={}",
        report.mode,
        report.elapsed.as_secs_f64(),
        report.total_records,
        report.missing_photo_url,
        report.downloaded,
        report.failed,
    );

    Ok(())
}
