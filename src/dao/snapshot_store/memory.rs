use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::dao::{snapshot_store::SnapshotStore, storage::StorageResult};

/// Process-local snapshot store, used by tests and the `memory` backend.
#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    documents: Arc<DashMap<String, Value>>,
}

impl MemorySnapshotStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently holding a snapshot.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether nothing was saved yet.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let value = self.documents.get(key).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(value) })
    }

    fn save_whole(&self, key: &str, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        self.documents.insert(key.to_string(), value);
        Box::pin(async move { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async move { Ok(()) })
    }
}
