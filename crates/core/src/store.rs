//! Snapshot store trait: session-keyed persistence owned by the calling shell.
//!
//! The constraint pipeline never touches storage itself; the shell loads a
//! snapshot, runs pure operations on it, and saves it back after every
//! successful mutation.

use crate::error::StoreError;
use crate::snapshot::Snapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of one design session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SessionId)
    }
}

/// The core SnapshotStore trait.
///
/// Implementations: in-memory (for tests and ephemeral use), one JSON file
/// per session on disk.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// The backend name (e.g., "in_memory", "file").
    fn name(&self) -> &str;

    /// Persist a snapshot, replacing any previous one for the session.
    async fn save(&self, id: SessionId, snapshot: &Snapshot) -> std::result::Result<(), StoreError>;

    /// Load a session's snapshot. `Ok(None)` when the session is unknown.
    async fn load(&self, id: SessionId) -> std::result::Result<Option<Snapshot>, StoreError>;

    /// Load a session's snapshot, or a default empty one when none exists.
    async fn load_or_default(&self, id: SessionId) -> std::result::Result<Snapshot, StoreError> {
        Ok(self.load(id).await?.unwrap_or_default())
    }

    /// All known session ids.
    async fn list(&self) -> std::result::Result<Vec<SessionId>, StoreError>;

    /// Remove a session. Returns `true` if it existed.
    async fn delete(&self, id: SessionId) -> std::result::Result<bool, StoreError>;
}
