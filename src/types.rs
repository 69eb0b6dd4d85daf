//! Core types for listing-dl

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// One listing entity returned by the remote API
///
/// Records are immutable once received. Field names in the wire format are
/// matched case-insensitively (the listing service has drifted between
/// `photoUrl` and `photourl` over time), which is handled by key
/// normalization in [`listing`](crate::listing) before this struct is
/// deserialized; the serde names here are the lowercased forms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier within a run
    pub id: i64,

    /// Street address of the listing
    #[serde(default)]
    pub address: String,

    /// Name of the current owner
    #[serde(rename = "homeowner", default)]
    pub owner_name: String,

    /// Asking price
    #[serde(default)]
    pub price: i64,

    /// Photo URL; may legitimately be empty, which means "no photo" and is
    /// skipped rather than treated as an error
    #[serde(rename = "photourl", default)]
    pub photo_url: String,
}

impl Record {
    /// Whether this record carries a photo to download
    pub fn has_photo(&self) -> bool {
        !self.photo_url.is_empty()
    }
}

/// One page of the listing response, discarded after records are extracted
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageResponse {
    /// The records on this page; an absent `houses` field yields an empty
    /// vector, never an error
    #[serde(rename = "houses", default)]
    pub records: Vec<Record>,

    /// Whether the service reported the page as ok
    #[serde(default)]
    pub ok: bool,
}

/// Run mode, fixed once at startup for the whole process lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Paginate the listing endpoint and download every photo
    Normal,
    /// Replay only the journaled failures from a previous run
    Recovery,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Normal => write!(f, "normal"),
            RunMode::Recovery => write!(f, "recovery"),
        }
    }
}

/// Summary of a completed run
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    /// Mode the run executed in
    pub mode: RunMode,

    /// Total records seen across all pages (0 in recovery mode)
    pub total_records: u64,

    /// Records with an empty photo URL (skipped, not failures)
    pub missing_photo_url: u64,

    /// Photos successfully written to the output store
    pub downloaded: u64,

    /// Distinct failed downloads left in the journal
    pub failed: u64,

    /// Total elapsed wall-clock time
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

/// Progress events emitted over the broadcast channel
///
/// Consumers subscribe via
/// [`ListingDownloader::subscribe`](crate::ListingDownloader::subscribe);
/// slow subscribers may miss events (broadcast semantics), the run itself
/// never blocks on them.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum Event {
    /// A listing page was fetched and parsed
    PageFetched {
        /// Page number (1-based)
        page: u32,
        /// Number of records on the page
        records: usize,
    },

    /// A record had no photo URL and was skipped
    PhotoSkipped {
        /// Record ID
        id: i64,
        /// Record address
        address: String,
    },

    /// A photo was downloaded and written to the output store
    PhotoDownloaded {
        /// Derived output name
        output_name: String,
        /// Size of the photo in bytes
        bytes: u64,
    },

    /// A photo download failed and was recorded for journal replay
    PhotoFailed {
        /// Derived output name (the journal key)
        output_name: String,
        /// Source photo URL (the journal value)
        url: String,
        /// Description of the failure
        error: String,
    },

    /// The run finished; the journal (if any) has been persisted
    RunComplete {
        /// Final statistics
        report: RunReport,
    },
}

/// In-memory mapping of failed photo downloads awaiting retry
///
/// Shared across the concurrent download workers of one page batch, so all
/// access goes through an async mutex. Keys are derived output names (which
/// embed unique record IDs, so collisions are not expected, but inserts are
/// safe even if one occurred), values are source URLs.
#[derive(Clone, Debug, Default)]
pub struct FailureMap {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl FailureMap {
    /// Create an empty failure map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a failure map pre-populated from a loaded journal
    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Record a failed download
    pub async fn insert(&self, output_name: String, source_url: String) {
        self.entries.lock().await.insert(output_name, source_url);
    }

    /// Remove an entry after a successful replay
    pub async fn remove(&self, output_name: &str) {
        self.entries.lock().await.remove(output_name);
    }

    /// Number of distinct failed downloads
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the map holds no failures
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Clone the current contents (for persistence or inspection)
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.lock().await.clone()
    }
}

// Serialize Duration as whole seconds with fractional part
mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_with_url_has_photo() {
        let record = Record {
            id: 1,
            address: "12 Main St".to_string(),
            owner_name: "A. Owner".to_string(),
            price: 250_000,
            photo_url: "http://example.com/1.jpg".to_string(),
        };
        assert!(record.has_photo());
    }

    #[test]
    fn record_with_empty_url_has_no_photo() {
        let record = Record {
            id: 2,
            address: "14 Main St".to_string(),
            owner_name: String::new(),
            price: 0,
            photo_url: String::new(),
        };
        assert!(!record.has_photo());
    }

    #[test]
    fn page_response_defaults_to_empty_records() {
        let page: PageResponse = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert!(page.records.is_empty());
        assert!(page.ok);
    }

    #[tokio::test]
    async fn failure_map_insert_and_snapshot() {
        let map = FailureMap::new();
        map.insert("1-a.jpg".to_string(), "http://x/a.jpg".to_string())
            .await;
        map.insert("2-b.png".to_string(), "http://x/b.png".to_string())
            .await;

        assert_eq!(map.len().await, 2);
        let snapshot = map.snapshot().await;
        assert_eq!(snapshot.get("1-a.jpg").unwrap(), "http://x/a.jpg");
    }

    #[tokio::test]
    async fn failure_map_insert_is_safe_across_clones() {
        let map = FailureMap::new();
        let mut handles = Vec::new();
        for i in 0..32 {
            let map = map.clone();
            handles.push(tokio::spawn(async move {
                map.insert(format!("{i}-x.jpg"), format!("http://x/{i}.jpg"))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(map.len().await, 32);
    }

    #[tokio::test]
    async fn failure_map_remove_drops_entry() {
        let map =
            FailureMap::from_entries(HashMap::from([("k".to_string(), "v".to_string())]));
        assert!(!map.is_empty().await);
        map.remove("k").await;
        assert!(map.is_empty().await);
    }

    #[test]
    fn run_mode_displays_lowercase() {
        assert_eq!(RunMode::Normal.to_string(), "normal");
        assert_eq!(RunMode::Recovery.to_string(), "recovery");
    }

    #[test]
    fn event_serializes_with_tag() {
        let event = Event::PhotoFailed {
            output_name: "1-a.jpg".to_string(),
            url: "http://x/a.jpg".to_string(),
            error: "status 500".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "photo_failed");
        assert_eq!(json["output_name"], "1-a.jpg");
    }
}
