//! Page-batch fan-out for photo downloads
//!
//! One page of records is fanned out to concurrent download workers over a
//! buffered stream, then joined in full before control returns for the next
//! page, with no partial returns and no cross-page concurrency. The
//! same path serves journal replay, which arrives as bare
//! `(output_name, source_url)` entries instead of records.

use crate::photo::{PhotoOutcome, download_photo};
use crate::store::PhotoStore;
use crate::types::{Event, FailureMap, Record};
use crate::utils::output_name;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Counts produced by one batch dispatch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Photos fetched and written to the store
    pub downloaded: u64,
    /// Records skipped for having no photo URL
    pub skipped: u64,
    /// Downloads recorded in the failure map
    pub failed: u64,
}

impl BatchOutcome {
    /// Fold another batch's counts into this one
    pub fn merge(&mut self, other: BatchOutcome) {
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Fans batches of downloads out to concurrent workers
///
/// Cheap to clone; all fields are shared handles.
#[derive(Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    store: Arc<dyn PhotoStore>,
    event_tx: broadcast::Sender<Event>,
    max_concurrent: usize,
}

impl Dispatcher {
    /// Create a dispatcher over the shared transport and store
    pub fn new(
        client: reqwest::Client,
        store: Arc<dyn PhotoStore>,
        event_tx: broadcast::Sender<Event>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            client,
            store,
            event_tx,
            max_concurrent,
        }
    }

    /// Fan one page of records out to download workers and join on completion
    ///
    /// Records without a photo URL are logged and counted as skipped; no
    /// task is spawned for them, and they never reach the failure map.
    /// Returns only after every launched download has completed (success or
    /// recorded failure).
    pub async fn dispatch_batch(&self, records: &[Record], failures: &FailureMap) -> BatchOutcome {
        let mut entries = Vec::with_capacity(records.len());
        let mut skipped: u64 = 0;

        for record in records {
            if !record.has_photo() {
                tracing::debug!(id = record.id, address = %record.address, "Record has no photo URL, skipping");
                self.event_tx
                    .send(Event::PhotoSkipped {
                        id: record.id,
                        address: record.address.clone(),
                    })
                    .ok();
                skipped += 1;
                continue;
            }
            entries.push((output_name(record), record.photo_url.clone()));
        }

        let mut outcome = self.dispatch_entries(entries, failures).await;
        outcome.skipped = skipped;
        outcome
    }

    /// Fan bare `(output_name, source_url)` entries out to download workers
    ///
    /// Used directly by journal replay, where output names were derived in a
    /// previous run and records are no longer available.
    pub async fn dispatch_entries(
        &self,
        entries: Vec<(String, String)>,
        failures: &FailureMap,
    ) -> BatchOutcome {
        let results: Vec<PhotoOutcome> = stream::iter(entries)
            .map(|(name, source_url)| {
                let client = self.client.clone();
                let store = Arc::clone(&self.store);
                let failures = failures.clone();
                let event_tx = self.event_tx.clone();

                async move {
                    let outcome =
                        download_photo(&client, store.as_ref(), &source_url, &name, &failures)
                            .await;
                    match &outcome {
                        PhotoOutcome::Downloaded { bytes } => {
                            event_tx
                                .send(Event::PhotoDownloaded {
                                    output_name: name,
                                    bytes: *bytes,
                                })
                                .ok();
                        }
                        PhotoOutcome::Failed { error } => {
                            event_tx
                                .send(Event::PhotoFailed {
                                    output_name: name,
                                    url: source_url,
                                    error: error.clone(),
                                })
                                .ok();
                        }
                    }
                    outcome
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for result in &results {
            match result {
                PhotoOutcome::Downloaded { .. } => outcome.downloaded += 1,
                PhotoOutcome::Failed { .. } => outcome.failed += 1,
            }
        }
        outcome
    }
}
