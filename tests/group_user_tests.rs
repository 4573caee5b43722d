mod common;

use std::sync::Arc;

use common::*;
use kickoff_back::{
    config::AppConfig,
    dao::{
        repository::{CURRENT_USER_KEY, USERS_KEY},
        snapshot_store::SnapshotStore,
    },
    dto::{
        group::{CreateGroupRequest, GroupPatch},
        health::HealthStatus,
        session::StartVotingRequest,
        user::{LoginRequest, UserPatch},
    },
    error::ServiceError,
    services::{group_service, health_service, session_service, user_service},
    state::{AppState, model::UserId, state_machine::SessionStatus},
};
use serde_json::Value;

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let (state, _store) = setup_state().await;
    register_user(&state, "Carla", 4.0).await;

    let duplicate = user_service::register(
        &state,
        kickoff_back::dto::user::RegisterRequest {
            name: "Outra Carla".into(),
            email: "CARLA@example.com".into(),
            position: Default::default(),
            manual_rating: 3.0,
            heart_team: None,
            dominant_foot: Default::default(),
            photo: None,
        },
    )
    .await;

    assert!(matches!(duplicate, Err(ServiceError::InvalidInput(_))));
    assert_eq!(user_service::list_users(&state).await.len(), 1);
}

#[tokio::test]
async fn test_login_logout_persist_current_user() {
    let (state, store) = setup_state().await;
    let carla = register_user(&state, "Carla", 4.0).await;

    let logged = user_service::login(
        &state,
        LoginRequest {
            email: "carla@example.com".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(logged.id, carla.to_string());
    assert_eq!(
        store.load(CURRENT_USER_KEY).await.unwrap(),
        Some(Value::String(carla.to_string()))
    );
    assert_eq!(
        user_service::current_user(&state).await.map(|user| user.id),
        Some(carla.to_string())
    );

    user_service::logout(&state).await.unwrap();
    assert!(user_service::current_user(&state).await.is_none());
    assert_eq!(store.load(CURRENT_USER_KEY).await.unwrap(), Some(Value::Null));

    let unknown = user_service::login(
        &state,
        LoginRequest {
            email: "nobody@example.com".into(),
        },
    )
    .await;
    assert!(matches!(unknown, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_edit_user_patches_profile() {
    let (state, _store) = setup_state().await;
    let carla = register_user(&state, "Carla", 4.0).await;

    let updated = user_service::edit_user(
        &state,
        &carla,
        UserPatch {
            manual_rating: Some(4.5),
            heart_team: Some(Some("Internacional".into())),
            ..UserPatch::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.manual_rating, 4.5);
    assert_eq!(updated.effective_rating, 4.5);
    assert_eq!(updated.heart_team.as_deref(), Some("Internacional"));
    assert_eq!(updated.name, "Carla");

    let cleared = user_service::edit_user(
        &state,
        &carla,
        UserPatch {
            heart_team: Some(None),
            ..UserPatch::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.heart_team, None);

    let invalid = user_service::edit_user(
        &state,
        &carla,
        UserPatch {
            manual_rating: Some(0.5),
            ..UserPatch::default()
        },
    )
    .await;
    assert!(matches!(invalid, Err(ServiceError::InvalidInput(_))));

    let missing =
        user_service::edit_user(&state, &UserId::from("u_missing"), UserPatch::default()).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_create_group_seeds_first_session_with_organizer() {
    let (state, _store) = setup_state().await;
    let carla = register_user(&state, "Carla", 4.0).await;

    let detail = group_service::create_group(
        &state,
        &carla,
        CreateGroupRequest {
            name: "  Pelada de Terça ".into(),
            sport: None,
            date: "2024-06-04".into(),
            time: None,
            price: None,
            max_players: None,
        },
    )
    .await
    .unwrap();

    let defaults = AppConfig::default().group_defaults;
    assert_eq!(detail.group.name, "Pelada de Terça");
    assert_eq!(detail.group.sport, "Futebol Society");
    assert_eq!(detail.group.organizer_id, carla.to_string());
    assert_eq!(detail.group.default_time, defaults.time);
    assert_eq!(detail.group.default_max_players, defaults.max_players);

    let session = detail.next_session.unwrap();
    assert_eq!(session.id, detail.group.next_session_id);
    assert_eq!(session.date, "2024-06-04");
    assert_eq!(session.status, SessionStatus::Scheduled);
    assert_eq!(session.confirmed.len(), 1);
    assert_eq!(session.confirmed[0].user_id, carla.to_string());

    assert_eq!(group_service::list_groups(&state).await.len(), 1);
}

#[tokio::test]
async fn test_create_group_requires_known_organizer_and_valid_date() {
    let (state, _store) = setup_state().await;
    let carla = register_user(&state, "Carla", 4.0).await;

    let request = |date: &str| CreateGroupRequest {
        name: "Quinta".into(),
        sport: None,
        date: date.into(),
        time: None,
        price: None,
        max_players: None,
    };

    let unknown =
        group_service::create_group(&state, &UserId::from("u_ghost"), request("2024-06-04")).await;
    assert!(matches!(unknown, Err(ServiceError::NotFound(_))));

    let bad_date = group_service::create_group(&state, &carla, request("2024-13-01")).await;
    assert!(matches!(bad_date, Err(ServiceError::InvalidInput(_))));

    assert!(group_service::list_groups(&state).await.is_empty());
}

#[tokio::test]
async fn test_edit_group_keeps_existing_sessions() {
    let (state, _store) = setup_state().await;
    let carla = register_user(&state, "Carla", 4.0).await;
    let group = create_test_group(&state, &carla, 10).await;

    let updated = group_service::edit_group(
        &state,
        group.group.id,
        GroupPatch {
            name: Some("Quinta Nova".into()),
            default_max_players: Some(12),
            default_time: Some("21:00".into()),
            ..GroupPatch::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Quinta Nova");
    assert_eq!(updated.default_max_players, 12);

    let session = session_service::get_session(&state, group.group.next_session_id)
        .await
        .unwrap();
    assert_eq!(session.max_players, 10);
    assert_eq!(session.time, "20:30");

    let bad_time = group_service::edit_group(
        &state,
        group.group.id,
        GroupPatch {
            default_time: Some("25:00".into()),
            ..GroupPatch::default()
        },
    )
    .await;
    assert!(matches!(bad_time, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn test_history_lists_finished_sessions_most_recent_first() {
    let (state, _store) = setup_state().await;
    let carla = register_user(&state, "Carla", 4.0).await;
    let diego = register_user(&state, "Diego", 3.0).await;
    let group = create_test_group(&state, &carla, 10).await;

    let mut session_id = group.group.next_session_id;
    for _ in 0..2 {
        session_service::confirm_presence(&state, session_id, &diego)
            .await
            .unwrap();
        session_service::start_voting(
            &state,
            session_id,
            StartVotingRequest {
                team_a: 1,
                team_b: 0,
            },
        )
        .await
        .unwrap();
        let vote = kickoff_back::dto::session::VoteRequest {
            ratings: [(diego.to_string(), 4)].into_iter().collect(),
        };
        session_service::submit_vote(&state, session_id, &carla, vote)
            .await
            .unwrap();
        session_id = session_service::finalize_session(&state, session_id, &carla)
            .await
            .unwrap()
            .successor
            .id;
    }

    let history = group_service::group_history(&state, group.group.id)
        .await
        .unwrap();
    let dates: Vec<&str> = history.iter().map(|entry| entry.session.date.as_str()).collect();
    assert_eq!(dates, ["2024-06-08", "2024-06-01"]);
    for entry in &history {
        assert_eq!(entry.session.status, SessionStatus::Finished);
        let top = entry.result.top_performer.as_ref().unwrap();
        assert_eq!(top.user_id, diego.to_string());
        assert_eq!(top.mean, 4.0);
    }

    // 3.0 -> (3.0 + 4.0) / 2 = 3.5 -> (3.5 + 4.0) / 2 = 3.75 -> 3.8
    let diego = user_service::get_user(&state, &diego).await.unwrap();
    assert_eq!(diego.community_rating, Some(3.8));
}

#[tokio::test]
async fn test_state_survives_reload_from_store() {
    let (state, store) = setup_state().await;
    let carla = register_user(&state, "Carla", 4.0).await;
    let group = create_test_group(&state, &carla, 10).await;

    let reloaded = AppState::bootstrap(AppConfig::default(), Arc::new(store.clone()))
        .await
        .unwrap();

    let detail = group_service::get_group(&reloaded, group.group.id)
        .await
        .unwrap();
    assert_eq!(detail.group.name, group.group.name);
    let session = detail.next_session.unwrap();
    assert_eq!(session.date, "2024-06-01");
    assert_eq!(session.confirmed[0].user_id, carla.to_string());
    assert_eq!(session.confirmed[0].name.as_deref(), Some("Carla"));

    let users = store.load(USERS_KEY).await.unwrap().unwrap();
    assert_eq!(users.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_health_reports_ok_for_memory_store() {
    let (state, _store) = setup_state().await;
    let health = health_service::health_status(&state).await;
    assert_eq!(health.status, HealthStatus::Ok);
    assert!(health.storage_error.is_none());
}
