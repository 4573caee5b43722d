use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::user::{LoginRequest, RegisterRequest, UserPatch, UserSummary},
    error::AppError,
    services::user_service,
    state::{SharedState, model::UserId},
};

/// Identity and profile endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(current_user))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).patch(edit_user))
}

/// Sign up a new member.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = UserSummary),
        (status = 400, description = "Invalid profile or email already registered")
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<RegisterRequest>>,
) -> Result<Json<UserSummary>, AppError> {
    Ok(Json(user_service::register(&state, payload).await?))
}

/// Record the user registered under the given email as the current user.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = UserSummary),
        (status = 404, description = "No user with that email")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<LoginRequest>>,
) -> Result<Json<UserSummary>, AppError> {
    Ok(Json(user_service::login(&state, payload).await?))
}

/// Clear the current user.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "users",
    responses((status = 204, description = "Logged out"))
)]
pub async fn logout(State(state): State<SharedState>) -> Result<StatusCode, AppError> {
    user_service::logout(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// User recorded by the last login.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserSummary),
        (status = 404, description = "Nobody is logged in")
    )
)]
pub async fn current_user(State(state): State<SharedState>) -> Result<Json<UserSummary>, AppError> {
    user_service::current_user(&state)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no user is logged in".into()))
}

/// Every registered member and admitted guest.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses((status = 200, description = "Members and guests", body = [UserSummary]))
)]
pub async fn list_users(State(state): State<SharedState>) -> Json<Vec<UserSummary>> {
    Json(user_service::list_users(&state).await)
}

/// Retrieve one user profile.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User found", body = UserSummary),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<UserSummary>, AppError> {
    Ok(Json(user_service::get_user(&state, &UserId::from(id)).await?))
}

/// Patch a user profile. Omitted fields are kept; `null` clears optional ones.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User identifier")),
    request_body = UserPatch,
    responses((status = 200, description = "Profile updated", body = UserSummary))
)]
pub async fn edit_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<UserPatch>>,
) -> Result<Json<UserSummary>, AppError> {
    Ok(Json(
        user_service::edit_user(&state, &UserId::from(id), payload).await?,
    ))
}
