//! Failure journal persistence and the recovery-mode trigger
//!
//! The journal is the failure map serialized as one JSON object in a
//! well-known file inside the output directory. Its presence at startup is
//! the sole signal that the next run replays journaled failures instead of
//! paginating the listing endpoint.
//!
//! Persisting always rewrites the file wholesale; earlier revisions of this
//! tool appended one JSON object per failed run and then only ever read the
//! first one back, silently dropping accumulated failures. Loading still
//! tolerates those legacy multi-line files by parsing every non-empty line
//! and merging, later lines winning.

use crate::error::{JournalError, Result};
use crate::types::FailureMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Handle on the journal file
#[derive(Clone, Debug)]
pub struct FailureJournal {
    path: PathBuf,
}

impl FailureJournal {
    /// Create a handle for the journal at `path` (nothing is touched on disk)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the journal file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a journal exists; this is the sole recovery-mode signal
    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Persist the failure map, overwriting any previous journal
    ///
    /// Writes nothing when the map is empty. This is an awaited step that
    /// completes (or fails loudly) before the run returns; it never races
    /// process teardown.
    pub async fn persist(&self, failures: &FailureMap) -> Result<()> {
        let snapshot = failures.snapshot().await;
        if snapshot.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_string(&snapshot)?;
        tokio::fs::write(&self.path, body).await.map_err(|e| {
            JournalError::WriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;

        tracing::info!(path = %self.path.display(), entries = snapshot.len(), "Failure journal persisted");
        Ok(())
    }

    /// Load the journaled failure entries
    ///
    /// Returns `Ok(None)` when no journal exists. Every non-empty line is
    /// parsed as a JSON object and merged (single-line files are the normal
    /// case). A journal that exists but yields no parseable line is
    /// malformed and surfaces as an error rather than silently starting a
    /// normal run, which would drop the accumulated failures.
    pub async fn load(&self) -> Result<Option<HashMap<String, String>>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut merged: HashMap<String, String> = HashMap::new();
        let mut parsed_any = false;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entries: HashMap<String, String> =
                serde_json::from_str(line).map_err(|e| JournalError::Malformed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })?;
            merged.extend(entries);
            parsed_any = true;
        }

        if !parsed_any {
            return Err(JournalError::Malformed {
                path: self.path.clone(),
                reason: "journal file contains no entries".to_string(),
            }
            .into());
        }

        Ok(Some(merged))
    }

    /// Remove the journal after a fully successful recovery run
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Failure journal cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn journal_in(temp_dir: &TempDir) -> FailureJournal {
        FailureJournal::new(temp_dir.path().join("missing_photos.txt"))
    }

    #[tokio::test]
    async fn empty_map_persists_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let journal = journal_in(&temp_dir);

        journal.persist(&FailureMap::new()).await.unwrap();

        assert!(!journal.exists().await);
    }

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let journal = journal_in(&temp_dir);
        let failures = FailureMap::new();
        failures
            .insert("1-a.jpg".to_string(), "http://x/a.jpg".to_string())
            .await;
        failures
            .insert("2-b.png".to_string(), "http://x/b.png".to_string())
            .await;

        journal.persist(&failures).await.unwrap();
        assert!(journal.exists().await);

        let loaded = journal.load().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("1-a.jpg").unwrap(), "http://x/a.jpg");
    }

    #[tokio::test]
    async fn persist_overwrites_rather_than_appends() {
        let temp_dir = TempDir::new().unwrap();
        let journal = journal_in(&temp_dir);

        let first = FailureMap::new();
        first
            .insert("1-a.jpg".to_string(), "http://x/a.jpg".to_string())
            .await;
        journal.persist(&first).await.unwrap();

        let second = FailureMap::new();
        second
            .insert("2-b.png".to_string(), "http://x/b.png".to_string())
            .await;
        journal.persist(&second).await.unwrap();

        let loaded = journal.load().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1, "second persist replaces the first");
        assert!(loaded.contains_key("2-b.png"));

        // And the file really is a single JSON object, not a line per run
        let raw = std::fs::read_to_string(journal.path()).unwrap();
        assert_eq!(raw.lines().count(), 1);
    }

    #[tokio::test]
    async fn load_merges_legacy_multi_line_journals() {
        let temp_dir = TempDir::new().unwrap();
        let journal = journal_in(&temp_dir);
        // Two appended runs, as the old append-only format produced; the
        // later line's value for a repeated key wins
        std::fs::write(
            journal.path(),
            concat!(
                "{\"1-a.jpg\": \"http://old/a.jpg\", \"2-b.png\": \"http://x/b.png\"}\n",
                "{\"1-a.jpg\": \"http://new/a.jpg\"}\n",
            ),
        )
        .unwrap();

        let loaded = journal.load().await.unwrap().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("1-a.jpg").unwrap(), "http://new/a.jpg");
        assert_eq!(loaded.get("2-b.png").unwrap(), "http://x/b.png");
    }

    #[tokio::test]
    async fn load_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let journal = journal_in(&temp_dir);
        assert!(journal.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_malformed_journal_is_loud() {
        let temp_dir = TempDir::new().unwrap();
        let journal = journal_in(&temp_dir);
        std::fs::write(journal.path(), "not json at all").unwrap();

        let err = journal.load().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Journal(JournalError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn load_blank_journal_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let journal = journal_in(&temp_dir);
        std::fs::write(journal.path(), "\n\n").unwrap();

        let err = journal.load().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Journal(JournalError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn clear_removes_the_file_and_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let journal = journal_in(&temp_dir);
        let failures = FailureMap::new();
        failures
            .insert("1-a.jpg".to_string(), "http://x/a.jpg".to_string())
            .await;
        journal.persist(&failures).await.unwrap();

        journal.clear().await.unwrap();
        assert!(!journal.exists().await);

        // Clearing an absent journal is fine
        journal.clear().await.unwrap();
    }

    #[tokio::test]
    async fn persist_creates_missing_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let journal =
            FailureJournal::new(temp_dir.path().join("out").join("missing_photos.txt"));
        let failures = FailureMap::new();
        failures
            .insert("1-a.jpg".to_string(), "http://x/a.jpg".to_string())
            .await;

        journal.persist(&failures).await.unwrap();
        assert!(journal.exists().await);
    }
}
