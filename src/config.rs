//! Configuration types for listing-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Listing endpoint configuration (base URL, pagination window)
///
/// Groups settings related to how the record source is queried.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Base URL of the listing endpoint (e.g., "https://api.example.com/houses")
    pub base_url: String,

    /// Number of pages to fetch, in order 1..=pages (default: 10)
    #[serde(default = "default_pages")]
    pub pages: u32,

    /// Records requested per page via the `per_page` query parameter (default: 10)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            pages: default_pages(),
            per_page: default_per_page(),
        }
    }
}

/// Download behavior configuration (output directory, concurrency, journal)
///
/// Groups settings related to how photos are fetched and stored.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Output directory for downloaded photos, created if absent
    /// (default: "./photos")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum concurrent photo downloads within one page batch (default: 10)
    ///
    /// The default matches the expected page size, so a whole page fans out
    /// at once. Raising `per_page` without raising this turns the dispatcher
    /// into a fixed-size worker pool.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,

    /// Journal filename inside the output directory (default: "missing_photos.txt")
    #[serde(default = "default_journal_filename")]
    pub journal_filename: String,

    /// Per-request HTTP timeout for listing and photo fetches (default: 10 seconds)
    #[serde(default = "default_http_timeout", with = "duration_serde")]
    pub http_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_concurrent_downloads: default_max_concurrent(),
            journal_filename: default_journal_filename(),
            http_timeout: default_http_timeout(),
        }
    }
}

/// Retry configuration for transient listing-endpoint failures
///
/// The listing fetch retries on any non-success status with a fixed backoff
/// interval. Photo downloads never retry in-run; they go through the journal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts (default: 1 second)
    #[serde(default = "default_backoff", with = "duration_serde")]
    pub backoff: Duration,

    /// Add random jitter to the backoff delay (default: false)
    ///
    /// Off by default so a small number of retries stays predictable; worth
    /// enabling if `max_attempts` is raised against a busy endpoint.
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_secs(1),
            jitter: false,
        }
    }
}

/// Main configuration for [`ListingDownloader`](crate::ListingDownloader)
///
/// Fields are organized into logical sub-configs:
/// - [`listing`](ListingConfig) — endpoint URL and pagination window
/// - [`download`](DownloadConfig) — output directory, concurrency, journal
/// - [`retry`](RetryConfig) — listing-fetch retry policy
///
/// All sub-config fields are flattened for serialization, so the JSON/TOML
/// format stays flat (no nesting).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listing endpoint settings
    #[serde(flatten)]
    pub listing: ListingConfig,

    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// Retry policy for the listing endpoint
    #[serde(flatten)]
    pub retry: RetryConfig,
}

// Convenience accessors — allow call sites to use `config.output_dir()` etc.
// without reaching through the sub-config structs.
impl Config {
    /// Output directory for downloaded photos
    pub fn output_dir(&self) -> &PathBuf {
        &self.download.output_dir
    }

    /// Full path of the journal file (inside the output directory)
    pub fn journal_path(&self) -> PathBuf {
        self.download.output_dir.join(&self.download.journal_filename)
    }

    /// Validate the configuration before a run
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a setting would make the run
    /// meaningless (empty base URL, zero concurrency, zero attempts).
    pub fn validate(&self) -> Result<()> {
        if self.listing.base_url.is_empty() {
            return Err(Error::Config {
                message: "listing base_url must not be empty".to_string(),
                key: Some("base_url".to_string()),
            });
        }
        if self.download.max_concurrent_downloads == 0 {
            return Err(Error::Config {
                message: "max_concurrent_downloads must be at least 1".to_string(),
                key: Some("max_concurrent_downloads".to_string()),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config {
                message: "max_attempts must be at least 1".to_string(),
                key: Some("max_attempts".to_string()),
            });
        }
        if self.download.journal_filename.is_empty() {
            return Err(Error::Config {
                message: "journal_filename must not be empty".to_string(),
                key: Some("journal_filename".to_string()),
            });
        }
        Ok(())
    }
}

fn default_pages() -> u32 {
    10
}

fn default_per_page() -> u32 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./photos")
}

fn default_max_concurrent() -> usize {
    10
}

fn default_journal_filename() -> String {
    "missing_photos.txt".to_string()
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff() -> Duration {
    Duration::from_secs(1)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
