use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::session::{
        DrawRequest, FinalizeResponse, GuestAdmission, GuestRequest, SessionSummary,
        StartVotingRequest, VoteRequest,
    },
    error::AppError,
    routes::actor::Actor,
    services::session_service,
    state::SharedState,
};

/// Session lifecycle endpoints: roster, draw, voting and finalize.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/confirm", post(confirm_presence))
        .route("/sessions/{id}/withdraw", post(withdraw_presence))
        .route("/sessions/{id}/guests", post(admit_guest))
        .route("/sessions/{id}/draw", post(draw_teams).delete(undo_draw))
        .route("/sessions/{id}/voting", post(start_voting))
        .route("/sessions/{id}/votes", post(submit_vote))
        .route("/sessions/{id}/finalize", post(finalize_session))
}

/// Retrieve a session with waitlist ranks and the starters/bench split.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session found", body = SessionSummary),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(session_service::get_session(&state, id).await?))
}

/// Confirm the acting user's presence.
#[utoipa::path(
    post,
    path = "/sessions/{id}/confirm",
    tag = "sessions",
    params(
        ("id" = Uuid, Path, description = "Session identifier"),
        ("X-User-Id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Presence confirmed", body = SessionSummary),
        (status = 409, description = "Roster locked")
    )
)]
pub async fn confirm_presence(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(
        session_service::confirm_presence(&state, id, &actor).await?,
    ))
}

/// Withdraw the acting user's presence.
#[utoipa::path(
    post,
    path = "/sessions/{id}/withdraw",
    tag = "sessions",
    params(
        ("id" = Uuid, Path, description = "Session identifier"),
        ("X-User-Id" = String, Header, description = "Acting user")
    ),
    responses((status = 200, description = "Presence withdrawn", body = SessionSummary))
)]
pub async fn withdraw_presence(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(
        session_service::withdraw_presence(&state, id, &actor).await?,
    ))
}

/// Create a guest and confirm them into the session.
#[utoipa::path(
    post,
    path = "/sessions/{id}/guests",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = GuestRequest,
    responses((status = 200, description = "Guest admitted", body = GuestAdmission))
)]
pub async fn admit_guest(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<GuestRequest>>,
) -> Result<Json<GuestAdmission>, AppError> {
    Ok(Json(session_service::admit_guest(&state, id, payload).await?))
}

/// Draw teams with the requested strategy, replacing any previous draw.
#[utoipa::path(
    post,
    path = "/sessions/{id}/draw",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = DrawRequest,
    responses((status = 200, description = "Teams drawn", body = SessionSummary))
)]
pub async fn draw_teams(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DrawRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(
        session_service::draw_teams(&state, id, payload.mode).await?,
    ))
}

/// Clear the current draw.
#[utoipa::path(
    delete,
    path = "/sessions/{id}/draw",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses((status = 200, description = "Draw cleared", body = SessionSummary))
)]
pub async fn undo_draw(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(session_service::undo_draw(&state, id).await?))
}

/// Record the final score and open voting.
#[utoipa::path(
    post,
    path = "/sessions/{id}/voting",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = StartVotingRequest,
    responses(
        (status = 200, description = "Voting opened", body = SessionSummary),
        (status = 409, description = "Session is not scheduled")
    )
)]
pub async fn start_voting(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<StartVotingRequest>>,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(session_service::start_voting(&state, id, payload).await?))
}

/// Submit or replace the acting user's rating sheet.
#[utoipa::path(
    post,
    path = "/sessions/{id}/votes",
    tag = "sessions",
    params(
        ("id" = Uuid, Path, description = "Session identifier"),
        ("X-User-Id" = String, Header, description = "Voting participant")
    ),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = SessionSummary),
        (status = 400, description = "Invalid rating sheet")
    )
)]
pub async fn submit_vote(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
    Valid(Json(payload)): Valid<Json<VoteRequest>>,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(
        session_service::submit_vote(&state, id, &actor, payload).await?,
    ))
}

/// Finish the session and schedule the next one with the acting user confirmed.
#[utoipa::path(
    post,
    path = "/sessions/{id}/finalize",
    tag = "sessions",
    params(
        ("id" = Uuid, Path, description = "Session identifier"),
        ("X-User-Id" = String, Header, description = "Finalizing user")
    ),
    responses(
        (status = 200, description = "Session finalized", body = FinalizeResponse),
        (status = 409, description = "Session is not in voting")
    )
)]
pub async fn finalize_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Actor(actor): Actor,
) -> Result<Json<FinalizeResponse>, AppError> {
    Ok(Json(
        session_service::finalize_session(&state, id, &actor).await?,
    ))
}
