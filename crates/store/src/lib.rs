//! Snapshot store implementations for plancraft.

pub mod file;
pub mod in_memory;

pub use file::FileStore;
pub use in_memory::InMemoryStore;

use plancraft_core::SnapshotStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Build the store named by a config `session.backend` value. Anything other
/// than `in_memory` gets the file store rooted at `dir`.
pub fn open(backend: &str, dir: PathBuf) -> Arc<dyn SnapshotStore> {
    match backend {
        "in_memory" => Arc::new(InMemoryStore::new()),
        _ => Arc::new(FileStore::new(dir)),
    }
}
