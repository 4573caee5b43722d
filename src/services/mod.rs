/// OpenAPI documentation generation.
pub mod documentation;
/// Group creation, editing and history.
pub mod group_service;
/// Health check service.
pub mod health_service;
/// Effective ratings and post-match vote aggregation.
pub mod rating;
/// Confirmation, waitlist and guest admission rules.
pub mod roster;
/// Session lifecycle: draws, voting and finalize.
pub mod session_service;
/// Team assignment strategies.
pub mod team_draw;
/// Registration, login and profile edits.
pub mod user_service;
