use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Kickoff Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::users::register,
        crate::routes::users::login,
        crate::routes::users::logout,
        crate::routes::users::current_user,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::edit_user,
        crate::routes::groups::list_groups,
        crate::routes::groups::create_group,
        crate::routes::groups::get_group,
        crate::routes::groups::edit_group,
        crate::routes::groups::group_history,
        crate::routes::sessions::get_session,
        crate::routes::sessions::confirm_presence,
        crate::routes::sessions::withdraw_presence,
        crate::routes::sessions::admit_guest,
        crate::routes::sessions::draw_teams,
        crate::routes::sessions::undo_draw,
        crate::routes::sessions::start_voting,
        crate::routes::sessions::submit_vote,
        crate::routes::sessions::finalize_session,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::user::RegisterRequest,
            crate::dto::user::LoginRequest,
            crate::dto::user::UserPatch,
            crate::dto::user::UserSummary,
            crate::dto::group::CreateGroupRequest,
            crate::dto::group::GroupPatch,
            crate::dto::group::GroupSummary,
            crate::dto::group::GroupDetail,
            crate::dto::group::HistoryEntry,
            crate::dto::session::GuestRequest,
            crate::dto::session::DrawRequest,
            crate::dto::session::StartVotingRequest,
            crate::dto::session::VoteRequest,
            crate::dto::session::SessionSummary,
            crate::dto::session::SessionResultSummary,
            crate::dto::session::GuestAdmission,
            crate::dto::session::FinalizeResponse,
            crate::services::team_draw::DrawMode,
            crate::state::model::Position,
            crate::state::model::DominantFoot,
            crate::state::state_machine::SessionStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Registration, login and profiles"),
        (name = "groups", description = "Recurring groups and their history"),
        (name = "sessions", description = "Roster, team draw, voting and finalize"),
    )
)]
/// OpenAPI document covering every route of the service.
pub struct ApiDoc;
