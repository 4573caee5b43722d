use axum::Router;

use crate::state::SharedState;

/// Acting user extractor.
pub mod actor;
/// Swagger UI and OpenAPI JSON.
pub mod docs;
/// Group routes.
pub mod groups;
/// Health check route.
pub mod health;
/// Session lifecycle routes.
pub mod sessions;
/// Identity and profile routes.
pub mod users;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(users::router())
        .merge(groups::router())
        .merge(sessions::router())
        .merge(docs::router());

    api_router.with_state(state)
}
