use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::group::{CreateGroupRequest, GroupDetail, GroupPatch, GroupSummary, HistoryEntry},
    error::AppError,
    routes::actor::Actor,
    services::group_service,
    state::SharedState,
};

/// Group management and history endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/{id}", get(get_group).patch(edit_group))
        .route("/groups/{id}/history", get(group_history))
}

/// List every group.
#[utoipa::path(
    get,
    path = "/groups",
    tag = "groups",
    responses((status = 200, description = "Known groups", body = [GroupSummary]))
)]
pub async fn list_groups(State(state): State<SharedState>) -> Json<Vec<GroupSummary>> {
    Json(group_service::list_groups(&state).await)
}

/// Create a group organised by the acting user, with its first session.
#[utoipa::path(
    post,
    path = "/groups",
    tag = "groups",
    params(("X-User-Id" = String, Header, description = "Organizer")),
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created", body = GroupDetail),
        (status = 400, description = "Invalid parameters")
    )
)]
pub async fn create_group(
    State(state): State<SharedState>,
    Actor(actor): Actor,
    Valid(Json(payload)): Valid<Json<CreateGroupRequest>>,
) -> Result<Json<GroupDetail>, AppError> {
    Ok(Json(
        group_service::create_group(&state, &actor, payload).await?,
    ))
}

/// Retrieve a group with its upcoming session.
#[utoipa::path(
    get,
    path = "/groups/{id}",
    tag = "groups",
    params(("id" = Uuid, Path, description = "Group identifier")),
    responses(
        (status = 200, description = "Group with its next session", body = GroupDetail),
        (status = 404, description = "Unknown group")
    )
)]
pub async fn get_group(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupDetail>, AppError> {
    Ok(Json(group_service::get_group(&state, id).await?))
}

/// Update the group's name, sport or defaults for future sessions.
#[utoipa::path(
    patch,
    path = "/groups/{id}",
    tag = "groups",
    params(("id" = Uuid, Path, description = "Group identifier")),
    request_body = GroupPatch,
    responses((status = 200, description = "Group updated", body = GroupSummary))
)]
pub async fn edit_group(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<GroupPatch>>,
) -> Result<Json<GroupSummary>, AppError> {
    Ok(Json(group_service::edit_group(&state, id, payload).await?))
}

/// Finished sessions of the group, most recent first.
#[utoipa::path(
    get,
    path = "/groups/{id}/history",
    tag = "groups",
    params(("id" = Uuid, Path, description = "Group identifier")),
    responses((status = 200, description = "Finished sessions with results", body = [HistoryEntry]))
)]
pub async fn group_history(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    Ok(Json(group_service::group_history(&state, id).await?))
}
