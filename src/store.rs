//! Output store for downloaded photos
//!
//! The surrounding program supplies the directory the pipeline writes into;
//! the core only depends on the [`PhotoStore`] capability. The default
//! [`FsPhotoStore`] writes one file per photo into a flat directory, created
//! at startup if absent, with overwrite semantics (a repeated name replaces
//! prior content).

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Capability for writing downloaded photo bytes under a derived name
///
/// Implementations must tolerate concurrent writers with distinct names;
/// the dispatcher never issues two concurrent writes for the same name.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Write photo bytes under `output_name`, replacing any prior content
    async fn write(&self, output_name: &str, bytes: &[u8]) -> Result<()>;

    /// Whether a photo with this name already exists in the store
    async fn contains(&self, output_name: &str) -> bool;
}

/// Filesystem-backed photo store
#[derive(Clone, Debug)]
pub struct FsPhotoStore {
    root: PathBuf,
}

impl FsPhotoStore {
    /// Open a store rooted at `root`, creating the directory if absent
    ///
    /// The directory is resolved once here, at startup, not re-derived per
    /// write.
    pub async fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl PhotoStore for FsPhotoStore {
    async fn write(&self, output_name: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::write(self.root.join(output_name), bytes).await?;
        Ok(())
    }

    async fn contains(&self, output_name: &str) -> bool {
        self.root.join(output_name).exists()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn create_makes_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        let store = FsPhotoStore::create(&nested).await.unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.root(), nested);
    }

    #[tokio::test]
    async fn write_then_contains() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsPhotoStore::create(temp_dir.path()).await.unwrap();

        assert!(!store.contains("1-x.jpg").await);
        store.write("1-x.jpg", b"jpeg bytes").await.unwrap();
        assert!(store.contains("1-x.jpg").await);

        let on_disk = std::fs::read(temp_dir.path().join("1-x.jpg")).unwrap();
        assert_eq!(on_disk, b"jpeg bytes");
    }

    #[tokio::test]
    async fn write_overwrites_prior_content() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsPhotoStore::create(temp_dir.path()).await.unwrap();

        store.write("1-x.jpg", b"first").await.unwrap();
        store.write("1-x.jpg", b"second").await.unwrap();

        let on_disk = std::fs::read(temp_dir.path().join("1-x.jpg")).unwrap();
        assert_eq!(on_disk, b"second");
    }

    #[tokio::test]
    async fn write_into_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsPhotoStore::create(temp_dir.path().join("gone"))
            .await
            .unwrap();
        std::fs::remove_dir(temp_dir.path().join("gone")).unwrap();

        let result = store.write("1-x.jpg", b"bytes").await;
        assert!(result.is_err());
    }
}
