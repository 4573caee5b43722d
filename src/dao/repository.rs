//! Store adapter translating between typed collections and the key-value
//! snapshot store. Each collection is read with a fallback default and written
//! back whole.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::dao::{
    models::{GroupEntity, SessionEntity, UserEntity},
    snapshot_store::SnapshotStore,
    storage::{StorageError, StorageResult},
};

/// Key of the users collection.
pub const USERS_KEY: &str = "users";
/// Key of the groups collection.
pub const GROUPS_KEY: &str = "groups";
/// Key of the sessions collection.
pub const SESSIONS_KEY: &str = "sessions";
/// Key holding the logged-in user identifier.
pub const CURRENT_USER_KEY: &str = "current_user";

/// Complete persisted state: the three collections plus the acting user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotEntities {
    /// Persisted users.
    pub users: Vec<UserEntity>,
    /// Persisted groups.
    pub groups: Vec<GroupEntity>,
    /// Persisted sessions.
    pub sessions: Vec<SessionEntity>,
    /// Identifier of the logged-in user, if any.
    pub current_user: Option<String>,
}

/// Typed access to the snapshot store.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn SnapshotStore>,
}

impl Repository {
    /// Wrap `store`.
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Read the value stored under `key`, or `default` when nothing was saved yet.
    pub async fn load_or_default<T>(&self, key: &str, default: T) -> StorageResult<T>
    where
        T: DeserializeOwned,
    {
        match self.store.load(key).await? {
            Some(value) => {
                serde_json::from_value(value).map_err(|source| StorageError::corrupted(key, source))
            }
            None => {
                debug!(key, "no snapshot stored; using default");
                Ok(default)
            }
        }
    }

    /// Replace the value stored under `key` with `value`.
    pub async fn save_whole<T>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let value = Self::encode(key, value)?;
        self.save_value(key, value).await
    }

    /// Serialize `value` into the document shape stored under `key`.
    pub fn encode<T>(key: &str, value: &T) -> StorageResult<Value>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value).map_err(|source| StorageError::corrupted(key, source))
    }

    /// Replace the document stored under `key` with an already encoded value.
    pub async fn save_value(&self, key: &str, value: Value) -> StorageResult<()> {
        self.store.save_whole(key, value).await
    }

    /// Load every collection, defaulting each one independently.
    pub async fn load_snapshot(&self) -> StorageResult<SnapshotEntities> {
        Ok(SnapshotEntities {
            users: self.load_or_default(USERS_KEY, Vec::new()).await?,
            groups: self.load_or_default(GROUPS_KEY, Vec::new()).await?,
            sessions: self.load_or_default(SESSIONS_KEY, Vec::new()).await?,
            current_user: self.load_or_default(CURRENT_USER_KEY, None).await?,
        })
    }

    /// Probe the underlying store.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.store.health_check().await
    }
}
