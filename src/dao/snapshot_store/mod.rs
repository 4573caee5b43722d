/// File-backed store.
#[cfg(feature = "file-store")]
pub mod file;
/// In-memory store.
pub mod memory;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::dao::storage::StorageResult;

/// Abstraction over the key-value persistence collaborator.
///
/// Every write replaces the whole document stored under the key; there are no
/// partial or delta writes.
pub trait SnapshotStore: Send + Sync {
    /// Document stored under `key`, or `None` when nothing was saved yet.
    fn load(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>>;
    /// Replace the document stored under `key`.
    fn save_whole(&self, key: &str, value: Value) -> BoxFuture<'static, StorageResult<()>>;
    /// Check that the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
