//! Route store backed by a TOML document on disk.
//!
//! The file is re-read on every `connect`, so edits take effect on the next
//! reload.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::store::{RouteStore, SnapshotSession, StoreError, StoreSession, StoreSnapshot};

/// A store reading `[[backends]]` and `[[content_items]]` from a TOML file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RouteStore for FileStore {
    async fn connect(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        tracing::debug!(path = ?self.path, "Opening route store file");
        let content = tokio::fs::read_to_string(&self.path).await?;
        let snapshot: StoreSnapshot =
            toml::from_str(&content).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(Box::new(SnapshotSession::new(snapshot)))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
