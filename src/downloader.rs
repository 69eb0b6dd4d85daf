//! Run orchestration: mode selection and the page loop
//!
//! A [`ListingDownloader`] executes exactly one run in one of two mutually
//! exclusive modes, chosen once at startup and never switched mid-run:
//!
//! - **Normal**: paginate the listing endpoint in order, fan each page's
//!   photos out through the dispatcher, and persist any failures to the
//!   journal before returning.
//! - **Recovery**: the journal file exists, so replay only its entries;
//!   the listing endpoint is never queried. Entries that fail again are
//!   re-journaled; a clean replay clears the journal.

use crate::config::Config;
use crate::dispatcher::{BatchOutcome, Dispatcher};
use crate::error::Result;
use crate::journal::FailureJournal;
use crate::listing::ListingClient;
use crate::store::{FsPhotoStore, PhotoStore};
use crate::types::{Event, FailureMap, RunMode, RunReport};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;

/// Capacity of the event broadcast channel; slow subscribers miss events
/// rather than blocking the run
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Main pipeline instance (cloneable - all fields are shared handles)
#[derive(Clone)]
pub struct ListingDownloader {
    config: Arc<Config>,
    listing: ListingClient,
    dispatcher: Dispatcher,
    journal: FailureJournal,
    event_tx: broadcast::Sender<Event>,
}

impl std::fmt::Debug for ListingDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingDownloader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ListingDownloader {
    /// Create a downloader with a filesystem photo store
    ///
    /// Validates the configuration, builds the shared HTTP transport with
    /// the configured per-request timeout, and creates the output directory
    /// if absent.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use listing_dl::{Config, ListingDownloader};
    /// use listing_dl::config::ListingConfig;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let config = Config {
    ///         listing: ListingConfig {
    ///             base_url: "https://api.example.com/houses".to_string(),
    ///             ..Default::default()
    ///         },
    ///         ..Default::default()
    ///     };
    ///
    ///     let downloader = ListingDownloader::new(config).await?;
    ///     let report = downloader.run().await?;
    ///     println!("downloaded {} photos", report.downloaded);
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let store = FsPhotoStore::create(config.output_dir()).await?;
        Self::with_store(config, Arc::new(store))
    }

    /// Create a downloader over a custom [`PhotoStore`] implementation
    ///
    /// The journal still lives at the configured journal path; only photo
    /// bytes go through the supplied store.
    pub fn with_store(config: Config, store: Arc<dyn PhotoStore>) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.download.http_timeout)
            .build()?;

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let listing = ListingClient::new(
            client.clone(),
            config.listing.base_url.clone(),
            config.retry.clone(),
        );
        let dispatcher = Dispatcher::new(
            client,
            store,
            event_tx.clone(),
            config.download.max_concurrent_downloads,
        );
        let journal = FailureJournal::new(config.journal_path());

        Ok(Self {
            config: Arc::new(config),
            listing,
            dispatcher,
            journal,
            event_tx,
        })
    }

    /// Subscribe to progress events
    ///
    /// Multiple subscribers are supported; each receives every event from
    /// the point of subscription (broadcast semantics).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Execute one run and return its summary
    ///
    /// Mode is fixed here: a journal on disk selects recovery, otherwise
    /// normal pagination. Journal persistence is an awaited step inside
    /// this call; when `run` returns `Ok`, the journal on disk reflects
    /// the run's remaining failures (or is gone, after a clean recovery).
    ///
    /// # Errors
    ///
    /// Only listing-endpoint retry exhaustion, a malformed journal, and
    /// journal/store I/O failures surface here. Individual photo failures
    /// never do; they are reported in [`RunReport::failed`] and journaled.
    pub async fn run(&self) -> Result<RunReport> {
        let start = Instant::now();

        let report = if self.journal.exists().await {
            self.run_recovery(start).await?
        } else {
            self.run_normal(start).await?
        };

        self.event_tx
            .send(Event::RunComplete {
                report: report.clone(),
            })
            .ok();
        Ok(report)
    }

    /// Normal mode: paginate, dispatch, persist failures
    async fn run_normal(&self, start: Instant) -> Result<RunReport> {
        let pages = self.config.listing.pages;
        let per_page = self.config.listing.per_page;
        tracing::info!(pages, per_page, "Starting normal run");

        let failures = FailureMap::new();
        let mut total_records: u64 = 0;
        let mut totals = BatchOutcome::default();

        // Pages are processed strictly in order; page N+1 does not begin
        // until page N's whole batch has joined
        for page in 1..=pages {
            let records = match self.listing.fetch_page(page, per_page).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::error!(page, error = %e, "Aborting run: listing endpoint unavailable");
                    return Err(e);
                }
            };

            self.event_tx
                .send(Event::PageFetched {
                    page,
                    records: records.len(),
                })
                .ok();

            total_records += records.len() as u64;
            totals.merge(self.dispatcher.dispatch_batch(&records, &failures).await);
        }

        let failed = failures.len().await as u64;
        self.journal.persist(&failures).await?;

        let elapsed = start.elapsed();
        tracing::info!(
            total_records,
            missing_photo_url = totals.skipped,
            downloaded = totals.downloaded,
            failed,
            elapsed_secs = %format!("{:.2}", elapsed.as_secs_f64()),
            "Run complete"
        );

        Ok(RunReport {
            mode: RunMode::Normal,
            total_records,
            missing_photo_url: totals.skipped,
            downloaded: totals.downloaded,
            failed,
            elapsed,
        })
    }

    /// Recovery mode: replay journal entries, re-journal what still fails
    async fn run_recovery(&self, start: Instant) -> Result<RunReport> {
        let entries = self.journal.load().await?.unwrap_or_default();
        tracing::info!(
            entries = entries.len(),
            "Journal present, replaying failed downloads"
        );

        let failures = FailureMap::new();
        let outcome = self
            .dispatcher
            .dispatch_entries(entries.into_iter().collect(), &failures)
            .await;

        // Preserve the do-not-lose-failing-URLs invariant: entries that
        // failed again replace the journal; a clean replay removes it
        let failed = failures.len().await as u64;
        if failed == 0 {
            self.journal.clear().await?;
        } else {
            self.journal.persist(&failures).await?;
        }

        let elapsed = start.elapsed();
        tracing::info!(
            downloaded = outcome.downloaded,
            failed,
            elapsed_secs = %format!("{:.2}", elapsed.as_secs_f64()),
            "Recovery run complete"
        );

        Ok(RunReport {
            mode: RunMode::Recovery,
            total_records: 0,
            missing_photo_url: 0,
            downloaded: outcome.downloaded,
            failed,
            elapsed,
        })
    }
}
