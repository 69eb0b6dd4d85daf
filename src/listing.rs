//! Paginated client for the remote listing endpoint
//!
//! The listing endpoint serves records in bounded pages:
//! `GET <base>?page=<n>&per_page=<n>`. Every non-success status is retried
//! with a fixed backoff up to the configured attempt ceiling; exhausting the
//! ceiling is fatal for the whole run, unlike individual photo failures
//! which are journaled and replayed later.
//!
//! Field names in the response body are matched case-insensitively (the
//! service has served `photoUrl`, `photourl` and `PhotoUrl` at various
//! points) by normalizing all object keys to lowercase before
//! deserialization.

use crate::config::RetryConfig;
use crate::error::{Error, ListingError, Result};
use crate::retry::fetch_with_retry;
use crate::types::{PageResponse, Record};

/// Client for the paginated listing endpoint
///
/// Cheap to clone; the inner `reqwest::Client` is already reference-counted
/// and shared with the photo downloader.
#[derive(Clone, Debug)]
pub struct ListingClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl ListingClient {
    /// Create a listing client over a shared HTTP transport
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, retry: RetryConfig) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            retry,
        }
    }

    /// Fetch one page of records
    ///
    /// Returns the records on the page (an empty vector when the `houses`
    /// field is absent, never an error for that case). Pages are requested
    /// with `page` and `per_page` query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::RetriesExhausted`] once every attempt came
    /// back with a non-success status; the caller treats this as fatal for
    /// the run. A body that parses as something other than a page object
    /// fails immediately with [`ListingError::InvalidBody`].
    pub async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<Record>> {
        let result = fetch_with_retry(&self.retry, || self.fetch_page_once(page, per_page)).await;

        match result {
            Ok(response) => {
                tracing::info!(page, records = response.records.len(), "Fetched listing page");
                Ok(response.records)
            }
            // The terminal BadStatus becomes the fatal exhaustion error
            Err(Error::Listing(ListingError::BadStatus { status, .. })) => {
                Err(ListingError::RetriesExhausted {
                    page,
                    attempts: self.retry.max_attempts,
                    last_status: status,
                }
                .into())
            }
            Err(other) => Err(other),
        }
    }

    /// One fetch attempt: request, status check, case-insensitive parse
    async fn fetch_page_once(&self, page: u32, per_page: u32) -> Result<PageResponse> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(page, status = status.as_u16(), "Listing page returned non-success status");
            return Err(ListingError::BadStatus {
                page,
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await?;
        parse_page(page, &body)
    }
}

/// Parse a page body with case-insensitive field matching
fn parse_page(page: u32, body: &[u8]) -> Result<PageResponse> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ListingError::InvalidBody {
            page,
            reason: e.to_string(),
        })?;

    serde_json::from_value(lowercase_keys(value)).map_err(|e| {
        ListingError::InvalidBody {
            page,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Recursively lowercase every object key so serde field names match
/// regardless of the casing the service used
fn lowercase_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(lowercase_keys).collect())
        }
        other => other,
    }
}
