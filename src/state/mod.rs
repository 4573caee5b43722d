/// Users, groups and sessions.
pub mod model;
/// Session status transitions.
pub mod state_machine;

use std::{sync::Arc, time::Duration};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        models::{GroupEntity, SessionEntity, UserEntity},
        repository::{
            CURRENT_USER_KEY, GROUPS_KEY, Repository, SESSIONS_KEY, SnapshotEntities, USERS_KEY,
        },
        snapshot_store::SnapshotStore,
        storage::StorageResult,
    },
    error::ServiceError,
    state::model::{Group, Session, User, UserId},
};

/// Application state shared across handlers.
pub type SharedState = Arc<AppState>;

/// In-memory copy of everything the store persists, indexed by identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    /// Members and guests by identifier.
    pub users: IndexMap<UserId, User>,
    /// Groups by identifier.
    pub groups: IndexMap<Uuid, Group>,
    /// Sessions of every group, by identifier.
    pub sessions: IndexMap<Uuid, Session>,
    /// User recorded by the last login.
    pub current_user: Option<UserId>,
}

impl World {
    /// Index the persisted collections. Later duplicates of an identifier win.
    pub fn from_snapshot(snapshot: SnapshotEntities) -> Self {
        let SnapshotEntities {
            users,
            groups,
            sessions,
            current_user,
        } = snapshot;

        let users: IndexMap<UserId, User> = users
            .into_iter()
            .map(User::from)
            .map(|user| (user.id.clone(), user))
            .collect();
        let current_user = current_user.map(UserId::from).filter(|id| {
            let known = users.contains_key(id);
            if !known {
                warn!(user_id = %id, "persisted current user no longer exists; clearing");
            }
            known
        });

        Self {
            users,
            groups: groups
                .into_iter()
                .map(Group::from)
                .map(|group| (group.id, group))
                .collect(),
            sessions: sessions
                .into_iter()
                .map(Session::from)
                .map(|session| (session.id, session))
                .collect(),
            current_user,
        }
    }

    /// Look up a user, or `NotFound`.
    pub fn user(&self, id: &UserId) -> Result<&User, ServiceError> {
        self.users
            .get(id)
            .ok_or_else(|| ServiceError::NotFound(format!("user `{id}` not found")))
    }

    /// Mutable variant of [`World::user`].
    pub fn user_mut(&mut self, id: &UserId) -> Result<&mut User, ServiceError> {
        self.users
            .get_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("user `{id}` not found")))
    }

    /// Look up a group, or `NotFound`.
    pub fn group(&self, id: Uuid) -> Result<&Group, ServiceError> {
        self.groups
            .get(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("group `{id}` not found")))
    }

    /// Mutable variant of [`World::group`].
    pub fn group_mut(&mut self, id: Uuid) -> Result<&mut Group, ServiceError> {
        self.groups
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("group `{id}` not found")))
    }

    /// Look up a session, or `NotFound`.
    pub fn session(&self, id: Uuid) -> Result<&Session, ServiceError> {
        self.sessions
            .get(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("session `{id}` not found")))
    }

    /// Mutable variant of [`World::session`].
    pub fn session_mut(&mut self, id: Uuid) -> Result<&mut Session, ServiceError> {
        self.sessions
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("session `{id}` not found")))
    }
}

/// Central application state: configuration, the store adapter and the
/// committed in-memory world.
pub struct AppState {
    config: Arc<AppConfig>,
    repository: Repository,
    world: RwLock<World>,
    mutation_gate: Mutex<()>,
    persist_timeout: Option<Duration>,
}

impl AppState {
    /// Load every collection from `store` and wrap the resulting state in an [`Arc`].
    pub async fn bootstrap(
        config: AppConfig,
        store: Arc<dyn SnapshotStore>,
    ) -> StorageResult<SharedState> {
        let repository = Repository::new(store);
        let world = World::from_snapshot(repository.load_snapshot().await?);
        debug!(
            users = world.users.len(),
            groups = world.groups.len(),
            sessions = world.sessions.len(),
            "world loaded from store"
        );

        Ok(Arc::new(Self {
            persist_timeout: config.persist_timeout(),
            config: Arc::new(config),
            repository,
            world: RwLock::new(world),
            mutation_gate: Mutex::new(()),
        }))
    }

    /// Loaded configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// Probe the underlying snapshot store.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.repository.health_check().await
    }

    /// Run a read-only projection against the latest committed world.
    pub async fn with_world<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&World) -> T,
    {
        let guard = self.world.read().await;
        f(&guard)
    }

    /// Run a mutation against a draft copy of the world.
    ///
    /// Mutations are serialised. The draft is persisted collection by
    /// collection (only those that changed) and becomes the committed world
    /// once every write succeeded. When `f` fails nothing is written; when a
    /// write fails or times out, the collections already written are restored
    /// to their previous documents, so memory and the store stay untouched.
    pub async fn with_world_mut<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut World) -> Result<T, ServiceError>,
    {
        let _gate = self.mutation_gate.lock().await;

        let before = self.world.read().await.clone();
        let mut draft = before.clone();
        let value = f(&mut draft)?;

        let writes = pending_writes(&before, &draft)?;
        if writes.is_empty() {
            return Ok(value);
        }

        let mut attempted = 0;
        let outcome = self.bounded(self.write_all(&writes, &mut attempted)).await;
        if let Err(err) = outcome {
            warn!(
                error = %err,
                attempted,
                "snapshot write failed; restoring previous documents"
            );
            self.roll_back(&writes[..attempted]).await;
            return Err(err);
        }

        *self.world.write().await = draft;
        Ok(value)
    }

    async fn bounded<F>(&self, write: F) -> Result<(), ServiceError>
    where
        F: Future<Output = StorageResult<()>>,
    {
        match self.persist_timeout {
            Some(limit) => match timeout(limit, write).await {
                Ok(result) => result.map_err(ServiceError::from),
                Err(_) => {
                    warn!(?limit, "snapshot write timed out");
                    Err(ServiceError::Timeout)
                }
            },
            None => write.await.map_err(ServiceError::from),
        }
    }

    /// Write every pending document in order. `attempted` counts writes that
    /// were started, including one that failed midway.
    async fn write_all(&self, writes: &[PendingWrite], attempted: &mut usize) -> StorageResult<()> {
        for write in writes {
            *attempted += 1;
            self.repository
                .save_value(write.key, write.after.clone())
                .await?;
        }
        Ok(())
    }

    async fn roll_back(&self, writes: &[PendingWrite]) {
        for write in writes.iter().rev() {
            let restore = self.repository.save_value(write.key, write.before.clone());
            if let Err(err) = self.bounded(restore).await {
                error!(key = write.key, error = %err, "failed to restore snapshot document");
            }
        }
    }
}

/// A collection document replaced by a mutation, with its previous value.
struct PendingWrite {
    key: &'static str,
    before: Value,
    after: Value,
}

impl PendingWrite {
    fn new<T>(key: &'static str, before: &T, after: &T) -> StorageResult<Self>
    where
        T: Serialize + ?Sized,
    {
        Ok(Self {
            key,
            before: Repository::encode(key, before)?,
            after: Repository::encode(key, after)?,
        })
    }
}

/// Documents to write for the collections that differ between `before` and
/// `after`. Sessions go first and groups last so a stored group never names a
/// session missing from the store.
fn pending_writes(before: &World, after: &World) -> StorageResult<Vec<PendingWrite>> {
    let mut writes = Vec::new();
    if before.sessions != after.sessions {
        writes.push(PendingWrite::new(
            SESSIONS_KEY,
            &session_entities(before),
            &session_entities(after),
        )?);
    }
    if before.users != after.users {
        writes.push(PendingWrite::new(
            USERS_KEY,
            &user_entities(before),
            &user_entities(after),
        )?);
    }
    if before.groups != after.groups {
        writes.push(PendingWrite::new(
            GROUPS_KEY,
            &group_entities(before),
            &group_entities(after),
        )?);
    }
    if before.current_user != after.current_user {
        writes.push(PendingWrite::new(
            CURRENT_USER_KEY,
            &before.current_user.as_ref().map(UserId::as_str),
            &after.current_user.as_ref().map(UserId::as_str),
        )?);
    }
    Ok(writes)
}

fn user_entities(world: &World) -> Vec<UserEntity> {
    world.users.values().map(Into::into).collect()
}

fn group_entities(world: &World) -> Vec<GroupEntity> {
    world.groups.values().map(Into::into).collect()
}

fn session_entities(world: &World) -> Vec<SessionEntity> {
    world.sessions.values().map(Into::into).collect()
}
