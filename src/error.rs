//! Error types for listing-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Listing, Download, Journal)
//! - Context information (page number, output name, HTTP status)
//!
//! Only listing-endpoint retry exhaustion is fatal for a run; individual
//! photo failures are converted into journal state by the dispatcher and
//! never surface through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for listing-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for listing-dl
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "output_dir")
        key: Option<String>,
    },

    /// Listing endpoint error
    #[error("listing error: {0}")]
    Listing(#[from] ListingError),

    /// Photo download error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Journal read or write error
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Listing-endpoint errors
#[derive(Debug, Error)]
pub enum ListingError {
    /// The listing endpoint kept returning non-success statuses until the
    /// retry ceiling was hit. Fatal for the whole run.
    #[error("page {page} fetch failed after {attempts} attempts (last status: {last_status})")]
    RetriesExhausted {
        /// The page that could not be fetched
        page: u32,
        /// Total attempts made before giving up
        attempts: u32,
        /// The HTTP status of the final attempt
        last_status: u16,
    },

    /// The listing endpoint answered with a non-success status (transient,
    /// retried by the client before escalating to `RetriesExhausted`)
    #[error("page {page} returned status {status}")]
    BadStatus {
        /// The page being fetched
        page: u32,
        /// The HTTP status received
        status: u16,
    },

    /// The page body could not be parsed into records
    #[error("page {page} body could not be parsed: {reason}")]
    InvalidBody {
        /// The page whose body was malformed
        page: u32,
        /// The underlying parse failure
        reason: String,
    },
}

/// Photo-download errors
///
/// These never escalate past the dispatcher; they are logged and recorded in
/// the failure map for journal replay.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The photo endpoint answered with a non-success status
    #[error("photo {url} returned status {status}")]
    HttpStatus {
        /// The photo URL that was fetched
        url: String,
        /// The HTTP status received
        status: u16,
    },

    /// The photo bytes could not be written to the output store
    #[error("failed to store {output_name}: {reason}")]
    StoreFailed {
        /// The derived output name that could not be written
        output_name: String,
        /// The underlying write failure
        reason: String,
    },
}

/// Journal errors
#[derive(Debug, Error)]
pub enum JournalError {
    /// The journal file exists but no line parsed as a failure map
    #[error("journal at {} is malformed: {reason}", path.display())]
    Malformed {
        /// Path of the journal file
        path: PathBuf,
        /// The underlying parse failure
        reason: String,
    },

    /// The journal file could not be written
    #[error("failed to write journal at {}: {reason}", path.display())]
    WriteFailed {
        /// Path of the journal file
        path: PathBuf,
        /// The underlying write failure
        reason: String,
    },
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_exhausted_display_includes_context() {
        let err = Error::Listing(ListingError::RetriesExhausted {
            page: 3,
            attempts: 5,
            last_status: 503,
        });
        let msg = err.to_string();
        assert!(msg.contains("page 3"));
        assert!(msg.contains("5 attempts"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn download_error_converts_into_error() {
        let err: Error = DownloadError::HttpStatus {
            url: "http://example.com/p.jpg".to_string(),
            status: 404,
        }
        .into();
        assert!(matches!(
            err,
            Error::Download(DownloadError::HttpStatus { status: 404, .. })
        ));
    }

    #[test]
    fn io_error_converts_into_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
