//! File store: one JSON snapshot per session directory.
//!
//! Layout: `<root>/<session-id>/session_record.json`. Snapshots are cached
//! after the first read and written through on every save. Writes go to a
//! temporary file first and are renamed into place, so a crash mid-write
//! leaves the previous snapshot intact.

use async_trait::async_trait;
use plancraft_core::{SessionId, Snapshot, SnapshotStore, StoreError};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// File name of the snapshot inside each session directory.
pub const RECORD_FILE: &str = "session_record.json";

pub struct FileStore {
    root: PathBuf,
    cache: Arc<RwLock<HashMap<SessionId, Snapshot>>>,
}

impl FileStore {
    /// A store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        debug!(root = %root.display(), "File snapshot store opened");
        Self {
            root,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session_dir(&self, id: SessionId) -> PathBuf {
        self.root.join(id.to_string())
    }

    pub fn record_path(&self, id: SessionId) -> PathBuf {
        self.session_dir(id).join(RECORD_FILE)
    }

    async fn read_from_disk(&self, id: SessionId) -> Result<Option<Snapshot>, StoreError> {
        let path = self.record_path(id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "Corrupted session snapshot");
                StoreError::Corrupted {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            })
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn save(&self, id: SessionId, snapshot: &Snapshot) -> Result<(), StoreError> {
        let dir = self.session_dir(id);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StoreError::Storage(format!("Failed to create session directory: {e}"))
        })?;

        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StoreError::Storage(format!("Failed to serialize snapshot: {e}")))?;

        let path = self.record_path(id);
        let tmp = dir.join(format!("{RECORD_FILE}.tmp"));
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to write snapshot: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to replace snapshot: {e}")))?;

        self.cache.write().await.insert(id, snapshot.clone());
        debug!(session = %id, "Snapshot saved");
        Ok(())
    }

    async fn load(&self, id: SessionId) -> Result<Option<Snapshot>, StoreError> {
        if let Some(snapshot) = self.cache.read().await.get(&id) {
            return Ok(Some(snapshot.clone()));
        }
        let loaded = self.read_from_disk(id).await?;
        if let Some(snapshot) = &loaded {
            self.cache.write().await.insert(id, snapshot.clone());
        }
        Ok(loaded)
    }

    async fn list(&self) -> Result<Vec<SessionId>, StoreError> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Storage(format!("Failed to list sessions: {e}"))),
        };

        let mut ids = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to list sessions: {e}")))?
        {
            let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<SessionId>().ok())
            else {
                continue;
            };
            if entry.path().join(RECORD_FILE).is_file() {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, id: SessionId) -> Result<bool, StoreError> {
        self.cache.write().await.remove(&id);
        match tokio::fs::remove_dir_all(self.session_dir(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Storage(format!("Failed to delete session: {e}"))),
        }
    }
}
