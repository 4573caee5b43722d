use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        group::{
            CreateGroupRequest, DEFAULT_SPORT, GroupDetail, GroupPatch, GroupSummary, HistoryEntry,
        },
        session::{SessionResultSummary, SessionSummary},
        validation::{parse_kickoff_time, parse_session_date},
    },
    error::ServiceError,
    services::rating::aggregate_session_result,
    state::{
        SharedState, World,
        model::{Group, Session, UserId},
    },
};

/// Create a group organised by `actor` together with its first session, on
/// which the organizer is already confirmed.
pub async fn create_group(
    state: &SharedState,
    actor: &UserId,
    request: CreateGroupRequest,
) -> Result<GroupDetail, ServiceError> {
    request.validate()?;
    let name = non_blank(&request.name, "group name")?;
    let date = parse_session_date(&request.date).map_err(invalid)?;
    let defaults = state.config().group_defaults.clone();
    let time = match request.time {
        Some(time) => {
            parse_kickoff_time(&time).map_err(invalid)?;
            time
        }
        None => defaults.time,
    };
    let sport = request
        .sport
        .as_deref()
        .map(str::trim)
        .filter(|sport| !sport.is_empty())
        .unwrap_or(DEFAULT_SPORT)
        .to_string();
    let price = request.price.unwrap_or(defaults.price);
    let max_players = request.max_players.unwrap_or(defaults.max_players);

    state
        .with_world_mut(|world| {
            world.user(actor)?;

            let group_id = Uuid::new_v4();
            let session = Session::scheduled(
                group_id,
                date,
                time.clone(),
                max_players,
                price,
                vec![actor.clone()],
            );
            let group = Group {
                id: group_id,
                name,
                sport,
                organizer_id: actor.clone(),
                default_time: time,
                default_price: price,
                default_max_players: max_players,
                next_session_id: session.id,
            };

            info!(
                %group_id,
                session_id = %session.id,
                organizer = %actor,
                "group created"
            );
            world.sessions.insert(session.id, session);
            world.groups.insert(group_id, group);
            detail(world, group_id)
        })
        .await
}

/// Update a group's name, sport or scheduling defaults. Sessions already
/// scheduled keep their own parameters.
pub async fn edit_group(
    state: &SharedState,
    id: Uuid,
    patch: GroupPatch,
) -> Result<GroupSummary, ServiceError> {
    patch.validate()?;
    if let Some(time) = &patch.default_time {
        parse_kickoff_time(time).map_err(invalid)?;
    }
    let name = patch
        .name
        .as_deref()
        .map(|name| non_blank(name, "group name"))
        .transpose()?;
    let sport = patch
        .sport
        .as_deref()
        .map(|sport| non_blank(sport, "sport"))
        .transpose()?;

    state
        .with_world_mut(|world| {
            let group = world.group_mut(id)?;
            if let Some(name) = name {
                group.name = name;
            }
            if let Some(sport) = sport {
                group.sport = sport;
            }
            if let Some(time) = patch.default_time {
                group.default_time = time;
            }
            if let Some(price) = patch.default_price {
                group.default_price = price;
            }
            if let Some(max_players) = patch.default_max_players {
                group.default_max_players = max_players;
            }
            info!(group_id = %id, "group updated");
            Ok(GroupSummary::from(&*group))
        })
        .await
}

/// Every group in creation order.
pub async fn list_groups(state: &SharedState) -> Vec<GroupSummary> {
    state
        .with_world(|world| world.groups.values().map(GroupSummary::from).collect())
        .await
}

/// A group with its upcoming session.
pub async fn get_group(state: &SharedState, id: Uuid) -> Result<GroupDetail, ServiceError> {
    state.with_world(|world| detail(world, id)).await
}

/// Finished sessions of a group, most recent first, each with its ranked result.
pub async fn group_history(
    state: &SharedState,
    id: Uuid,
) -> Result<Vec<HistoryEntry>, ServiceError> {
    state
        .with_world(|world| {
            world.group(id)?;

            let mut finished: Vec<&Session> = world
                .sessions
                .values()
                .filter(|session| session.group_id == id && session.status.is_terminal())
                .collect();
            finished.sort_by(|a, b| b.date.cmp(&a.date));

            Ok(finished
                .into_iter()
                .map(|session| HistoryEntry {
                    session: SessionSummary::project(session, &world.users),
                    result: SessionResultSummary::from(&aggregate_session_result(
                        session,
                        &world.users,
                    )),
                })
                .collect())
        })
        .await
}

fn detail(world: &World, id: Uuid) -> Result<GroupDetail, ServiceError> {
    let group = world.group(id)?;
    Ok(GroupDetail {
        group: GroupSummary::from(group),
        next_session: world
            .sessions
            .get(&group.next_session_id)
            .map(|session| SessionSummary::project(session, &world.users)),
    })
}

fn non_blank(value: &str, field: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::InvalidInput(format!("{field} cannot be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}

fn invalid(err: validator::ValidationError) -> ServiceError {
    ServiceError::InvalidInput(err.to_string())
}
