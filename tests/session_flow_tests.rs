mod common;

use std::collections::{HashMap, HashSet};

use common::*;
use kickoff_back::{
    dao::{repository::SESSIONS_KEY, snapshot_store::SnapshotStore},
    dto::session::{GuestRequest, StartVotingRequest, VoteRequest},
    error::ServiceError,
    services::{
        group_service, session_service,
        team_draw::DrawMode,
        user_service,
    },
    state::{model::UserId, state_machine::SessionStatus},
};
use rand::{SeedableRng, rngs::StdRng};

fn sheet(ratings: &[(&UserId, u8)]) -> VoteRequest {
    VoteRequest {
        ratings: ratings
            .iter()
            .map(|(id, score)| (id.to_string(), *score))
            .collect::<HashMap<_, _>>(),
    }
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let (state, _store) = setup_state().await;
    let organizer = register_user(&state, "Carla", 4.0).await;
    let p1 = register_user(&state, "Diego", 3.0).await;
    let p2 = register_user(&state, "Elisa", 2.0).await;
    let p3 = register_user(&state, "Fabio", 5.0).await;

    let group = create_test_group(&state, &organizer, 10).await;
    let session_id = group.group.next_session_id;

    for player in [&p1, &p2, &p3] {
        session_service::confirm_presence(&state, session_id, player)
            .await
            .unwrap();
    }

    let drawn = session_service::draw_teams_with_rng(
        &state,
        session_id,
        DrawMode::BalancedManual,
        &mut StdRng::seed_from_u64(1),
    )
    .await
    .unwrap();
    let teams = drawn.teams.expect("teams should be drawn");
    // sorted by rating: Fabio(5) Carla(4) Diego(3) Elisa(2)
    assert_eq!(teams.team_a.starters.len() + teams.team_a.bench.len(), 2);
    assert_eq!(teams.team_b.starters.len() + teams.team_b.bench.len(), 2);

    let voting = session_service::start_voting(
        &state,
        session_id,
        StartVotingRequest {
            team_a: 5,
            team_b: 3,
        },
    )
    .await
    .unwrap();
    assert_eq!(voting.status, SessionStatus::Voting);
    assert_eq!(voting.score.team_a, 5);

    session_service::submit_vote(&state, session_id, &organizer, sheet(&[(&p1, 5), (&p2, 3)]))
        .await
        .unwrap();
    session_service::submit_vote(&state, session_id, &p3, sheet(&[(&p1, 4), (&p2, 4)]))
        .await
        .unwrap();

    let outcome = session_service::finalize_session(&state, session_id, &p3)
        .await
        .unwrap();

    // finished session keeps its roster, teams, votes and score
    assert_eq!(outcome.finished.status, SessionStatus::Finished);
    assert_eq!(outcome.finished.confirmed.len(), 4);
    assert!(outcome.finished.teams.is_some());
    assert_eq!(outcome.finished.votes.len(), 2);
    assert_eq!(outcome.finished.score.team_a, 5);

    // successor one week later with only the finalizing user confirmed
    let successor = &outcome.successor;
    assert_eq!(successor.date, "2024-06-08");
    assert_eq!(successor.time, "20:30");
    assert_eq!(successor.max_players, 10);
    assert_eq!(successor.price_per_person, 15.0);
    assert_eq!(successor.status, SessionStatus::Scheduled);
    assert_eq!(successor.confirmed.len(), 1);
    assert_eq!(successor.confirmed[0].user_id, p3.to_string());
    assert!(successor.teams.is_none());
    assert_eq!(successor.score.team_a, 0);
    assert_eq!(successor.score.team_b, 0);
    assert!(successor.votes.is_empty());
    assert_eq!(outcome.group.next_session_id, successor.id);

    // aggregate: p1 mean 4.5, p2 mean 3.5
    let top = outcome.result.top_performer.as_ref().unwrap();
    assert_eq!(top.user_id, p1.to_string());
    assert_eq!(top.mean, 4.5);
    let bottom = outcome.result.bottom_performer.as_ref().unwrap();
    assert_eq!(bottom.user_id, p2.to_string());
    assert_eq!(bottom.mean, 3.5);

    // community ratings: (3.0 + 4.5) / 2 = 3.75 -> 3.8, (2.0 + 3.5) / 2 = 2.75 -> 2.8
    let diego = user_service::get_user(&state, &p1).await.unwrap();
    assert_eq!(diego.community_rating, Some(3.8));
    let elisa = user_service::get_user(&state, &p2).await.unwrap();
    assert_eq!(elisa.community_rating, Some(2.8));
    let fabio = user_service::get_user(&state, &p3).await.unwrap();
    assert_eq!(fabio.community_rating, None);

    let detail = group_service::get_group(&state, group.group.id).await.unwrap();
    assert_eq!(detail.next_session.unwrap().id, successor.id);
}

#[tokio::test]
async fn test_second_finalize_is_rejected() {
    let (state, _store) = setup_state().await;
    let organizer = register_user(&state, "Carla", 4.0).await;
    let group = create_test_group(&state, &organizer, 10).await;
    let session_id = group.group.next_session_id;

    session_service::start_voting(
        &state,
        session_id,
        StartVotingRequest {
            team_a: 0,
            team_b: 0,
        },
    )
    .await
    .unwrap();

    // no votes at all: still finalizes and spawns a successor
    let first = session_service::finalize_session(&state, session_id, &organizer)
        .await
        .unwrap();
    assert!(first.result.players.is_empty());
    assert!(first.result.top_performer.is_none());

    let second = session_service::finalize_session(&state, session_id, &organizer).await;
    assert!(matches!(second, Err(ServiceError::InvalidState(_))));

    let sessions_in_group = state
        .with_world(|world| {
            world
                .sessions
                .values()
                .filter(|session| session.group_id == group.group.id)
                .count()
        })
        .await;
    assert_eq!(sessions_in_group, 2);
}

#[tokio::test]
async fn test_finalize_requires_voting() {
    let (state, _store) = setup_state().await;
    let organizer = register_user(&state, "Carla", 4.0).await;
    let group = create_test_group(&state, &organizer, 10).await;

    let result =
        session_service::finalize_session(&state, group.group.next_session_id, &organizer).await;
    assert!(matches!(result, Err(ServiceError::InvalidState(_))));
}

#[tokio::test]
async fn test_roster_change_clears_draw() {
    let (state, _store) = setup_state().await;
    let organizer = register_user(&state, "Carla", 4.0).await;
    let p1 = register_user(&state, "Diego", 3.0).await;
    let group = create_test_group(&state, &organizer, 10).await;
    let session_id = group.group.next_session_id;

    session_service::confirm_presence(&state, session_id, &p1)
        .await
        .unwrap();
    let drawn = session_service::draw_teams(&state, session_id, DrawMode::Random)
        .await
        .unwrap();
    assert!(drawn.teams.is_some());

    // repeated confirmation keeps the draw
    let same = session_service::confirm_presence(&state, session_id, &p1)
        .await
        .unwrap();
    assert!(same.teams.is_some());

    let admitted = session_service::admit_guest(
        &state,
        session_id,
        GuestRequest {
            name: "Primo do Diego".into(),
            position: None,
            manual_rating: None,
            heart_team: None,
        },
    )
    .await
    .unwrap();
    assert!(admitted.guest.is_guest);
    assert_eq!(admitted.guest.manual_rating, 3.0);
    assert!(admitted.session.teams.is_none());
    assert_eq!(admitted.session.confirmed.len(), 3);

    let redrawn = session_service::draw_teams(&state, session_id, DrawMode::HeartTeam)
        .await
        .unwrap();
    assert!(redrawn.teams.is_some());

    let withdrawn = session_service::withdraw_presence(&state, session_id, &p1)
        .await
        .unwrap();
    assert!(withdrawn.teams.is_none());
    assert_eq!(withdrawn.confirmed.len(), 2);
}

#[tokio::test]
async fn test_draw_partitions_confirmed_and_undo_clears_it() {
    let (state, _store) = setup_state().await;
    let organizer = register_user(&state, "Carla", 4.0).await;
    let group = create_test_group(&state, &organizer, 6).await;
    let session_id = group.group.next_session_id;

    let mut expected: HashSet<String> = HashSet::from([organizer.to_string()]);
    for (index, rating) in [1.0, 2.0, 3.0, 4.0, 5.0, 2.5, 3.5].into_iter().enumerate() {
        let player = register_user(&state, &format!("Player{index}"), rating).await;
        session_service::confirm_presence(&state, session_id, &player)
            .await
            .unwrap();
        expected.insert(player.to_string());
    }

    let summary = session_service::draw_teams_with_rng(
        &state,
        session_id,
        DrawMode::BalancedCommunity,
        &mut StdRng::seed_from_u64(3),
    )
    .await
    .unwrap();

    // capacity 6 with 8 confirmed: two waitlisted, both drawn
    assert_eq!(summary.waitlisted_count, 2);
    assert_eq!(summary.confirmed[7].waitlist_rank, Some(2));

    let teams = summary.teams.unwrap();
    assert_eq!(summary.players_per_team, 2);
    assert_eq!(teams.team_a.starters.len(), 2);
    assert_eq!(teams.team_a.bench.len(), 2);

    let drawn: HashSet<String> = [
        teams.team_a.starters,
        teams.team_a.bench,
        teams.team_b.starters,
        teams.team_b.bench,
    ]
    .into_iter()
    .flatten()
    .collect();
    assert_eq!(drawn, expected);

    let undone = session_service::undo_draw(&state, session_id).await.unwrap();
    assert!(undone.teams.is_none());
    assert_eq!(undone.status, SessionStatus::Scheduled);
}

#[tokio::test]
async fn test_invalid_vote_leaves_store_unchanged() {
    let (state, store) = setup_state().await;
    let organizer = register_user(&state, "Carla", 4.0).await;
    let p1 = register_user(&state, "Diego", 3.0).await;
    let outsider = register_user(&state, "Gil", 3.0).await;
    let group = create_test_group(&state, &organizer, 10).await;
    let session_id = group.group.next_session_id;

    session_service::confirm_presence(&state, session_id, &p1)
        .await
        .unwrap();
    session_service::start_voting(
        &state,
        session_id,
        StartVotingRequest {
            team_a: 1,
            team_b: 1,
        },
    )
    .await
    .unwrap();

    let persisted_before = store.load(SESSIONS_KEY).await.unwrap();

    let cases = [
        (&organizer, sheet(&[(&organizer, 5)])),
        (&organizer, sheet(&[(&outsider, 5)])),
        (&outsider, sheet(&[(&p1, 5)])),
        (&organizer, sheet(&[(&p1, 9)])),
    ];
    for (voter, request) in cases {
        let result = session_service::submit_vote(&state, session_id, voter, request).await;
        assert!(
            matches!(result, Err(ServiceError::InvalidInput(_))),
            "expected invalid input, got {result:?}"
        );
    }

    assert_eq!(store.load(SESSIONS_KEY).await.unwrap(), persisted_before);
    let view = session_service::get_session(&state, session_id).await.unwrap();
    assert!(view.votes.is_empty());

    // roster is locked once voting started
    let late = session_service::confirm_presence(&state, session_id, &outsider).await;
    assert!(matches!(late, Err(ServiceError::InvalidState(_))));
}

#[tokio::test]
async fn test_resubmitted_vote_overwrites_previous_sheet() {
    let (state, _store) = setup_state().await;
    let organizer = register_user(&state, "Carla", 4.0).await;
    let p1 = register_user(&state, "Diego", 3.0).await;
    let group = create_test_group(&state, &organizer, 10).await;
    let session_id = group.group.next_session_id;

    session_service::confirm_presence(&state, session_id, &p1)
        .await
        .unwrap();
    session_service::start_voting(
        &state,
        session_id,
        StartVotingRequest {
            team_a: 2,
            team_b: 2,
        },
    )
    .await
    .unwrap();

    session_service::submit_vote(&state, session_id, &organizer, sheet(&[(&p1, 2)]))
        .await
        .unwrap();
    let view = session_service::submit_vote(&state, session_id, &organizer, sheet(&[(&p1, 5)]))
        .await
        .unwrap();

    assert_eq!(view.votes.len(), 1);
    assert_eq!(view.votes[organizer.as_str()][p1.as_str()], 5);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (state, _store) = setup_state().await;
    let organizer = register_user(&state, "Carla", 4.0).await;

    let result =
        session_service::confirm_presence(&state, uuid::Uuid::new_v4(), &organizer).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
