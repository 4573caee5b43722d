//! Session lifecycle operations: roster changes, draws, voting and the
//! finalize step that rolls a group into its next occurrence.
//!
//! Every mutation runs through [`AppState::with_world_mut`](crate::state::AppState::with_world_mut)
//! so a rejected operation never reaches the store.

use rand::{Rng, SeedableRng, rngs::StdRng};
use time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        group::GroupSummary,
        session::{
            FinalizeResponse, GuestAdmission, GuestRequest, SessionResultSummary, SessionSummary,
            StartVotingRequest, VoteRequest,
        },
        user::UserSummary,
    },
    error::ServiceError,
    services::{
        rating::{aggregate_session_result, update_community_rating},
        roster::{self, GuestProfile},
        team_draw::{self, DrawMode},
    },
    state::{
        SharedState, World,
        model::{Score, Session, User, UserId, VoteSheet},
        state_machine::SessionEvent,
    },
};

/// Days between two occurrences of a group.
const RECURRENCE_DAYS: i64 = 7;

/// Project a session for callers.
pub async fn get_session(state: &SharedState, id: Uuid) -> Result<SessionSummary, ServiceError> {
    state
        .with_world(|world| {
            let session = world.session(id)?;
            Ok(SessionSummary::project(session, &world.users))
        })
        .await
}

/// Add the acting user to the confirmed list. Already confirmed users are a no-op.
pub async fn confirm_presence(
    state: &SharedState,
    session_id: Uuid,
    actor: &UserId,
) -> Result<SessionSummary, ServiceError> {
    state
        .with_world_mut(|world| {
            world.user(actor)?;
            let changed = roster::confirm(world.session_mut(session_id)?, actor)?;
            if changed {
                info!(%session_id, user_id = %actor, "presence confirmed");
            } else {
                debug!(%session_id, user_id = %actor, "presence already confirmed");
            }
            project(world, session_id)
        })
        .await
}

/// Remove the acting user from the confirmed list. Absent users are a no-op.
pub async fn withdraw_presence(
    state: &SharedState,
    session_id: Uuid,
    actor: &UserId,
) -> Result<SessionSummary, ServiceError> {
    state
        .with_world_mut(|world| {
            let changed = roster::withdraw(world.session_mut(session_id)?, actor)?;
            if changed {
                info!(%session_id, user_id = %actor, "presence withdrawn");
            } else {
                debug!(%session_id, user_id = %actor, "withdraw ignored; user was not confirmed");
            }
            project(world, session_id)
        })
        .await
}

/// Create a guest user from the admission form and confirm them into the session.
pub async fn admit_guest(
    state: &SharedState,
    session_id: Uuid,
    request: GuestRequest,
) -> Result<GuestAdmission, ServiceError> {
    request.validate()?;
    let default_rating = state.config().guest_default_rating;

    state
        .with_world_mut(|world| {
            // status guard first so no orphan guest is created for a locked roster
            if !world.session(session_id)?.status.accepts_roster_changes() {
                return Err(ServiceError::InvalidState(format!(
                    "guests cannot join session `{session_id}` once voting has started"
                )));
            }

            let guest = roster::new_guest(GuestProfile {
                name: request.name,
                position: request.position.unwrap_or_default(),
                manual_rating: request.manual_rating.unwrap_or(default_rating),
                heart_team: request.heart_team,
            })?;
            roster::confirm(world.session_mut(session_id)?, &guest.id)?;
            info!(%session_id, guest_id = %guest.id, "guest admitted");

            let summary = UserSummary::from(&guest);
            world.users.insert(guest.id.clone(), guest);
            Ok(GuestAdmission {
                guest: summary,
                session: project(world, session_id)?,
            })
        })
        .await
}

/// Partition the confirmed list into two teams, replacing any previous draw.
pub async fn draw_teams(
    state: &SharedState,
    session_id: Uuid,
    mode: DrawMode,
) -> Result<SessionSummary, ServiceError> {
    let mut rng = StdRng::from_rng(&mut rand::rng());
    draw_teams_with_rng(state, session_id, mode, &mut rng).await
}

/// Same as [`draw_teams`] with a caller-provided random source.
pub async fn draw_teams_with_rng<R>(
    state: &SharedState,
    session_id: Uuid,
    mode: DrawMode,
    rng: &mut R,
) -> Result<SessionSummary, ServiceError>
where
    R: Rng + Send,
{
    state
        .with_world_mut(|world| {
            let session = world.session(session_id)?;
            ensure_scheduled(session, "draw teams")?;

            let players = session
                .confirmed
                .iter()
                .map(|id| {
                    world.users.get(id).cloned().ok_or_else(|| {
                        ServiceError::NotFound(format!("confirmed participant `{id}` not found"))
                    })
                })
                .collect::<Result<Vec<User>, _>>()?;

            let teams = team_draw::draw_teams(&players, mode, rng);
            debug!(
                %session_id,
                ?mode,
                team_a = teams.team_a.len(),
                team_b = teams.team_b.len(),
                "teams drawn"
            );
            world.session_mut(session_id)?.teams = Some(teams);
            project(world, session_id)
        })
        .await
}

/// Clear the team assignment without touching status or votes.
pub async fn undo_draw(
    state: &SharedState,
    session_id: Uuid,
) -> Result<SessionSummary, ServiceError> {
    state
        .with_world_mut(|world| {
            let session = world.session_mut(session_id)?;
            ensure_scheduled(session, "undo the draw")?;
            if session.teams.take().is_some() {
                info!(%session_id, "draw undone");
            }
            project(world, session_id)
        })
        .await
}

/// Record the final score and open the session for peer votes.
pub async fn start_voting(
    state: &SharedState,
    session_id: Uuid,
    request: StartVotingRequest,
) -> Result<SessionSummary, ServiceError> {
    request.validate()?;
    let score = Score {
        team_a: score_value(request.team_a)?,
        team_b: score_value(request.team_b)?,
    };

    state
        .with_world_mut(|world| {
            let session = world.session_mut(session_id)?;
            session.status = session.status.apply(SessionEvent::StartVoting)?;
            session.score = score;
            info!(
                %session_id,
                team_a = score.team_a,
                team_b = score.team_b,
                "voting opened"
            );
            project(world, session_id)
        })
        .await
}

/// Store the actor's rating sheet, overwriting any previous submission.
pub async fn submit_vote(
    state: &SharedState,
    session_id: Uuid,
    actor: &UserId,
    request: VoteRequest,
) -> Result<SessionSummary, ServiceError> {
    request.validate()?;

    state
        .with_world_mut(|world| {
            let session = world.session_mut(session_id)?;
            if !session.status.accepts_votes() {
                return Err(ServiceError::InvalidState(format!(
                    "session `{session_id}` is not accepting votes while {:?}",
                    session.status
                )));
            }
            let sheet = vote_sheet(session, actor, request)?;
            let replaced = session.votes.insert(actor.clone(), sheet).is_some();
            info!(%session_id, voter = %actor, replaced, "vote recorded");
            project(world, session_id)
        })
        .await
}

/// Close the session, fold its votes into community ratings and schedule the
/// next occurrence with `actor` as its only confirmed participant.
pub async fn finalize_session(
    state: &SharedState,
    session_id: Uuid,
    actor: &UserId,
) -> Result<FinalizeResponse, ServiceError> {
    state
        .with_world_mut(|world| {
            world.user(actor)?;
            let session = world.session(session_id)?;
            let status = session.status.apply(SessionEvent::Finalize)?;
            let group_id = session.group_id;
            world.group(group_id)?;

            let result = aggregate_session_result(session, &world.users);
            let successor = successor_of(session, actor.clone())?;

            let mut updated_users = Vec::new();
            for player in &result.players {
                let Some(user) = world.users.get_mut(&player.id) else {
                    warn!(
                        %session_id,
                        user_id = %player.id,
                        "rated participant no longer exists; skipping rating update"
                    );
                    continue;
                };
                let rating = update_community_rating(user, player.mean);
                debug!(
                    user_id = %user.id,
                    previous = ?user.community_rating,
                    rating,
                    "community rating updated"
                );
                user.community_rating = Some(rating);
                updated_users.push(UserSummary::from(&*user));
            }

            world.session_mut(session_id)?.status = status;
            let successor_id = successor.id;
            world.sessions.insert(successor_id, successor);
            let group = world.group_mut(group_id)?;
            group.next_session_id = successor_id;
            let group = GroupSummary::from(&*group);

            info!(
                %session_id,
                %successor_id,
                %group_id,
                rated = updated_users.len(),
                "session finalized"
            );

            Ok(FinalizeResponse {
                finished: project(world, session_id)?,
                successor: project(world, successor_id)?,
                group,
                result: SessionResultSummary::from(&result),
                updated_users,
            })
        })
        .await
}

fn project(world: &World, session_id: Uuid) -> Result<SessionSummary, ServiceError> {
    Ok(SessionSummary::project(world.session(session_id)?, &world.users))
}

fn ensure_scheduled(session: &Session, action: &str) -> Result<(), ServiceError> {
    if session.status.accepts_roster_changes() {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "cannot {action} for session `{}` while {:?}",
            session.id, session.status
        )))
    }
}

fn score_value(value: i64) -> Result<u32, ServiceError> {
    u32::try_from(value).map_err(|_| {
        ServiceError::InvalidInput(format!("score must be a non-negative integer (got {value})"))
    })
}

/// Check a rating sheet against the session roster.
fn vote_sheet(
    session: &Session,
    voter: &UserId,
    request: VoteRequest,
) -> Result<VoteSheet, ServiceError> {
    if !session.is_confirmed(voter) {
        return Err(ServiceError::InvalidInput(format!(
            "voter `{voter}` is not confirmed for session `{}`",
            session.id
        )));
    }

    let mut ratings: Vec<(UserId, u8)> = request
        .ratings
        .into_iter()
        .map(|(rated, score)| (UserId::from(rated), score))
        .collect();
    // keep the persisted sheet independent of hash order
    ratings.sort_by(|a, b| a.0.cmp(&b.0));

    for (rated, score) in &ratings {
        if rated == voter {
            return Err(ServiceError::InvalidInput(
                "participants cannot rate themselves".into(),
            ));
        }
        if !session.is_confirmed(rated) {
            return Err(ServiceError::InvalidInput(format!(
                "`{rated}` is not a confirmed participant"
            )));
        }
        if !(1..=5).contains(score) {
            return Err(ServiceError::InvalidInput(format!(
                "score for `{rated}` must be between 1 and 5 (got {score})"
            )));
        }
    }

    Ok(ratings.into_iter().collect())
}

fn successor_of(session: &Session, organizer: UserId) -> Result<Session, ServiceError> {
    let date = session
        .date
        .checked_add(Duration::days(RECURRENCE_DAYS))
        .ok_or_else(|| ServiceError::InvalidState(format!("no date follows {}", session.date)))?;

    Ok(Session::scheduled(
        session.group_id,
        date,
        session.time.clone(),
        session.max_players,
        session.price_per_person,
        vec![organizer],
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use time::macros::date;

    use super::*;
    use crate::state::state_machine::SessionStatus;

    fn voting_session(confirmed: &[&str]) -> Session {
        let mut session = Session::scheduled(
            Uuid::new_v4(),
            date!(2024 - 06 - 01),
            "19:00".into(),
            10,
            15.0,
            confirmed.iter().map(|id| UserId::from(*id)).collect(),
        );
        session.status = SessionStatus::Voting;
        session
    }

    fn request(ratings: &[(&str, u8)]) -> VoteRequest {
        VoteRequest {
            ratings: ratings
                .iter()
                .map(|(id, score)| (id.to_string(), *score))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn successor_is_one_week_later_with_only_the_organizer() {
        let mut session = voting_session(&["u_a", "u_b"]);
        session.score = Score { team_a: 3, team_b: 2 };

        let next = successor_of(&session, "u_b".into()).unwrap();

        assert_eq!(next.date, date!(2024 - 06 - 08));
        assert_eq!(next.group_id, session.group_id);
        assert_eq!(next.time, "19:00");
        assert_eq!(next.max_players, 10);
        assert_eq!(next.price_per_person, 15.0);
        assert_eq!(next.confirmed, vec![UserId::from("u_b")]);
        assert_eq!(next.status, SessionStatus::Scheduled);
        assert_eq!(next.score, Score::default());
        assert!(next.teams.is_none());
        assert!(next.votes.is_empty());
        assert_ne!(next.id, session.id);
    }

    #[test]
    fn successor_crosses_month_boundaries() {
        let mut session = voting_session(&["u_a"]);
        session.date = date!(2024 - 02 - 26);
        let next = successor_of(&session, "u_a".into()).unwrap();
        assert_eq!(next.date, date!(2024 - 03 - 04));
    }

    #[test]
    fn vote_sheet_is_sorted_and_accepts_empty_sheets() {
        let session = voting_session(&["u_a", "u_b", "u_c"]);

        let sheet = vote_sheet(&session, &"u_a".into(), request(&[("u_c", 2), ("u_b", 5)])).unwrap();
        let ids: Vec<&str> = sheet.keys().map(UserId::as_str).collect();
        assert_eq!(ids, ["u_b", "u_c"]);

        assert!(vote_sheet(&session, &"u_a".into(), request(&[])).unwrap().is_empty());
    }

    #[test]
    fn vote_sheet_rejects_invalid_entries() {
        let session = voting_session(&["u_a", "u_b"]);
        let cases = [
            ("u_a", request(&[("u_a", 4)])),  // self rating
            ("u_a", request(&[("u_z", 4)])),  // not confirmed
            ("u_z", request(&[("u_a", 4)])),  // voter not confirmed
            ("u_a", request(&[("u_b", 0)])),  // out of range
            ("u_a", request(&[("u_b", 6)])),  // out of range
        ];

        for (voter, request) in cases {
            assert!(matches!(
                vote_sheet(&session, &voter.into(), request),
                Err(ServiceError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn scores_must_fit_non_negative_range() {
        assert_eq!(score_value(0).unwrap(), 0);
        assert!(matches!(score_value(-1), Err(ServiceError::InvalidInput(_))));
    }
}
