use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, state::model::UserId};

/// Header naming the user on whose behalf a request acts.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Acting user taken from the `X-User-Id` header.
///
/// The header only identifies the caller; it is not an authentication token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub UserId);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Actor(UserId::from(value)))
            .ok_or_else(|| AppError::Unauthorized("missing acting user header `X-User-Id`".into()))
    }
}
