//! Per-record photo download worker
//!
//! A worker makes exactly one attempt: fetch the bytes, write them through
//! the store. It never retries; a failed photo is recorded in the failure
//! map and retried by journal replay on a later run. Every invocation ends
//! in exactly one of {file write, failure-map insertion}.

use crate::error::{DownloadError, Error, Result};
use crate::store::PhotoStore;
use crate::types::FailureMap;

/// Outcome of a single photo download attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhotoOutcome {
    /// The photo was fetched and written to the store
    Downloaded {
        /// Size of the photo in bytes
        bytes: u64,
    },
    /// The attempt failed and was recorded in the failure map
    Failed {
        /// Description of the failure
        error: String,
    },
}

/// Download one photo and write it to the store
///
/// On any failure (network error, non-success status, store write failure)
/// the failure is logged and `(output_name -> source_url)` is inserted into
/// the failure map. The error never propagates; photo failures are
/// recoverable and must not abort the page batch.
pub async fn download_photo(
    client: &reqwest::Client,
    store: &dyn PhotoStore,
    source_url: &str,
    output_name: &str,
    failures: &FailureMap,
) -> PhotoOutcome {
    match fetch_and_store(client, store, source_url, output_name).await {
        Ok(bytes) => {
            tracing::debug!(output_name, bytes, "Photo downloaded");
            PhotoOutcome::Downloaded { bytes }
        }
        Err(e) => {
            tracing::warn!(output_name, error = %e, "Photo download failed, recording for retry");
            failures
                .insert(output_name.to_string(), source_url.to_string())
                .await;
            PhotoOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// Fetch raw bytes from the photo endpoint and write them verbatim
async fn fetch_and_store(
    client: &reqwest::Client,
    store: &dyn PhotoStore,
    source_url: &str,
    output_name: &str,
) -> Result<u64> {
    let response = client.get(source_url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::HttpStatus {
            url: source_url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let bytes = response.bytes().await?;

    store.write(output_name, &bytes).await.map_err(|e| {
        Error::Download(DownloadError::StoreFailed {
            output_name: output_name.to_string(),
            reason: e.to_string(),
        })
    })?;

    Ok(bytes.len() as u64)
}
