/// Persisted entity shapes for users, groups and sessions.
pub mod models;
/// Typed load-or-default / save-whole adapter over the snapshot store.
pub mod repository;
/// Key-value snapshot store abstraction and its backends.
pub mod snapshot_store;
/// Storage error types shared by every backend.
pub mod storage;
