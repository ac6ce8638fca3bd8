//! In-memory store: useful for tests and throwaway sessions.

use async_trait::async_trait;
use plancraft_core::{SessionId, Snapshot, SnapshotStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps every snapshot in a map; nothing survives the process.
pub struct InMemoryStore {
    sessions: Arc<RwLock<HashMap<SessionId, Snapshot>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn save(&self, id: SessionId, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.sessions.write().await.insert(id, snapshot.clone());
        Ok(())
    }

    async fn load(&self, id: SessionId) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<SessionId>, StoreError> {
        let mut ids: Vec<SessionId> = self.sessions.read().await.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, id: SessionId) -> Result<bool, StoreError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancraft_core::{KeyQuestion, KeyQuestions};

    #[tokio::test]
    async fn save_and_load() {
        let store = InMemoryStore::new();
        let id = SessionId::new();
        let snapshot = Snapshot::new(KeyQuestions::new(vec![KeyQuestion::unknown("room_types", "")]));

        store.save(id, &snapshot).await.unwrap();
        assert_eq!(store.load(id).await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn unknown_session_loads_default() {
        let store = InMemoryStore::new();
        let id = SessionId::new();
        assert!(store.load(id).await.unwrap().is_none());
        assert_eq!(store.load_or_default(id).await.unwrap(), Snapshot::default());
    }

    #[tokio::test]
    async fn list_and_delete() {
        let store = InMemoryStore::new();
        let a = SessionId::new();
        let b = SessionId::new();
        store.save(a, &Snapshot::default()).await.unwrap();
        store.save(b, &Snapshot::default()).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);

        assert!(store.delete(a).await.unwrap());
        assert!(!store.delete(a).await.unwrap());
        assert_eq!(store.list().await.unwrap(), vec![b]);
    }
}
