use std::sync::Arc;

use kickoff_back::{
    config::AppConfig,
    dao::snapshot_store::memory::MemorySnapshotStore,
    dto::{
        group::{CreateGroupRequest, GroupDetail},
        user::RegisterRequest,
    },
    services::{group_service, user_service},
    state::{AppState, SharedState, model::UserId},
};

/// Fresh application state over an empty in-memory store.
pub async fn setup_state() -> (SharedState, MemorySnapshotStore) {
    let store = MemorySnapshotStore::new();
    let state = AppState::bootstrap(AppConfig::default(), Arc::new(store.clone()))
        .await
        .expect("Failed to bootstrap state");
    (state, store)
}

/// Register a member with the given manual rating and return their identifier.
pub async fn register_user(state: &SharedState, name: &str, rating: f64) -> UserId {
    let request = RegisterRequest {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        position: Default::default(),
        manual_rating: rating,
        heart_team: None,
        dominant_foot: Default::default(),
        photo: None,
    };
    let user = user_service::register(state, request)
        .await
        .expect("Failed to register test user");
    UserId::from(user.id)
}

/// Create a group organised by `organizer` whose first session is on 2024-06-01.
#[allow(dead_code)]
pub async fn create_test_group(
    state: &SharedState,
    organizer: &UserId,
    max_players: u32,
) -> GroupDetail {
    let request = CreateGroupRequest {
        name: "Quinta do Society".to_string(),
        sport: None,
        date: "2024-06-01".to_string(),
        time: Some("20:30".to_string()),
        price: Some(15.0),
        max_players: Some(max_players),
    };
    group_service::create_group(state, organizer, request)
        .await
        .expect("Failed to create test group")
}
