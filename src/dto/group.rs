use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        session::{SessionResultSummary, SessionSummary},
        validation::{validate_kickoff_time, validate_session_date},
    },
    state::model::Group,
};

/// Sport label applied when a group is created without one.
pub const DEFAULT_SPORT: &str = "Futebol Society";

/// Parameters for a new recurring group and its first session.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateGroupRequest {
    /// Display name; surrounding whitespace is trimmed.
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: String,
    /// Sport label; defaults to Futebol Society.
    #[serde(default)]
    pub sport: Option<String>,
    /// Date of the first session, `YYYY-MM-DD`.
    #[validate(custom(function = "validate_session_date"))]
    pub date: String,
    /// Kick-off time, `HH:MM`. Falls back to the configured default.
    #[serde(default)]
    #[validate(custom(function = "validate_kickoff_time"))]
    pub time: Option<String>,
    /// Price per person. Falls back to the configured default.
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    /// Session capacity. Falls back to the configured default.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub max_players: Option<u32>,
}

/// Partial update of a group; existing sessions are not rewritten.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct GroupPatch {
    /// New display name.
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    /// New sport label.
    #[validate(length(min = 1, message = "sport cannot be empty"))]
    pub sport: Option<String>,
    /// Kick-off time for future sessions, `HH:MM`.
    #[validate(custom(function = "validate_kickoff_time"))]
    pub default_time: Option<String>,
    /// Price per person for future sessions.
    #[validate(range(min = 0.0))]
    pub default_price: Option<f64>,
    /// Capacity for future sessions.
    #[validate(range(min = 1))]
    pub default_max_players: Option<u32>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
/// Public projection of a group.
pub struct GroupSummary {
    /// Group identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Sport label.
    pub sport: String,
    /// User who created the group.
    pub organizer_id: String,
    /// Default kick-off time, `HH:MM`.
    pub default_time: String,
    /// Default price per person.
    pub default_price: f64,
    /// Default capacity.
    pub default_max_players: u32,
    /// Upcoming session that is still scheduled or voting.
    pub next_session_id: Uuid,
}

impl From<&Group> for GroupSummary {
    fn from(value: &Group) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            sport: value.sport.clone(),
            organizer_id: value.organizer_id.to_string(),
            default_time: value.default_time.clone(),
            default_price: value.default_price,
            default_max_players: value.default_max_players,
            next_session_id: value.next_session_id,
        }
    }
}

/// Group together with its upcoming session.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupDetail {
    /// The group itself.
    pub group: GroupSummary,
    /// Absent only when the persisted pointer is stale.
    pub next_session: Option<SessionSummary>,
}

/// One finished session of a group's history.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryEntry {
    /// The finished session.
    pub session: SessionSummary,
    /// Ranked vote outcome of the session.
    pub result: SessionResultSummary,
}
