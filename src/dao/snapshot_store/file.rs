//! Snapshot store writing one JSON document per key inside a data directory.

use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::fs;
use tracing::debug;

use crate::dao::{
    snapshot_store::SnapshotStore,
    storage::{StorageError, StorageResult},
};

/// Snapshot store backed by JSON files on disk.
#[derive(Clone)]
pub struct FileSnapshotStore {
    root: Arc<PathBuf>,
}

impl FileSnapshotStore {
    /// Open (and create when missing) the data directory backing the store.
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|source| {
            StorageError::unavailable(
                format!("failed to create data directory `{}`", root.display()),
                source,
            )
        })?;

        Ok(Self {
            root: Arc::new(root),
        })
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let path = self.document_path(key);
        let key = key.to_string();
        Box::pin(async move {
            let contents = match fs::read(&path).await {
                Ok(contents) => contents,
                Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
                Err(err) => {
                    return Err(StorageError::unavailable(
                        format!("failed to read `{}`", path.display()),
                        err,
                    ));
                }
            };

            serde_json::from_slice(&contents)
                .map(Some)
                .map_err(|source| StorageError::corrupted(&key, source))
        })
    }

    fn save_whole(&self, key: &str, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.document_path(key);
        let staging = self.root.join(format!(".{key}.json.tmp"));
        let key = key.to_string();
        Box::pin(async move {
            let payload = serde_json::to_vec_pretty(&value)
                .map_err(|source| StorageError::corrupted(&key, source))?;

            fs::write(&staging, payload).await.map_err(|source| {
                StorageError::unavailable(format!("failed to write `{}`", staging.display()), source)
            })?;
            fs::rename(&staging, &path).await.map_err(|source| {
                StorageError::unavailable(format!("failed to replace `{}`", path.display()), source)
            })?;

            debug!(key = %key, path = %path.display(), "snapshot written");
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let root = Arc::clone(&self.root);
        Box::pin(async move {
            let metadata = fs::metadata(root.as_path()).await.map_err(|source| {
                StorageError::unavailable(
                    format!("data directory `{}` is not accessible", root.display()),
                    source,
                )
            })?;

            if metadata.permissions().readonly() {
                return Err(StorageError::unavailable(
                    format!("data directory `{}` is read-only", root.display()),
                    std::io::Error::from(ErrorKind::PermissionDenied),
                ));
            }

            Ok(())
        })
    }
}
