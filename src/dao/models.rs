use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::state::{
    model::{DominantFoot, Position},
    state_machine::SessionStatus,
};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Participant record persisted in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserEntity {
    /// Stable identifier (`u_` prefix for members, `guest_` for guests).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login e-mail; guests have none.
    #[serde(default)]
    pub email: Option<String>,
    /// Preferred position; unknown values load as `unknown`.
    pub position: Position,
    /// Self-assigned skill rating (1-5).
    pub manual_rating: f64,
    /// Peer-voted rating, absent until the first finalized session with votes.
    #[serde(default)]
    pub community_rating: Option<f64>,
    /// Supported club; absent means no team.
    #[serde(default)]
    pub heart_team: Option<String>,
    /// Preferred foot, right when missing.
    #[serde(default)]
    pub dominant_foot: DominantFoot,
    /// Photo URL or data URI.
    #[serde(default)]
    pub photo: Option<String>,
    /// Set for participants admitted as guests.
    #[serde(default)]
    pub is_guest: bool,
}

/// Recurring series of sessions persisted in the `groups` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupEntity {
    /// Group identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Sport label.
    pub sport: String,
    /// Identifier of the user who created the group.
    pub organizer_id: String,
    /// Kick-off time (`HH:MM`) used to seed new sessions.
    pub default_time: String,
    /// Price per person used to seed new sessions.
    pub default_price: f64,
    /// Capacity used to seed new sessions.
    pub default_max_players: u32,
    /// Session that is still `scheduled` or `voting` for this group.
    pub next_session_id: Uuid,
}

/// Two-sided team assignment produced by a draw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamsEntity {
    /// Team A member ids in positional order.
    pub team_a: Vec<String>,
    /// Team B member ids in positional order.
    pub team_b: Vec<String>,
}

/// Final score captured when voting opens.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntity {
    /// Goals scored by team A.
    pub team_a: u32,
    /// Goals scored by team B.
    pub team_b: u32,
}

/// One concrete occurrence of a group's match persisted in the `sessions` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionEntity {
    /// Session identifier.
    pub id: Uuid,
    /// Owning group.
    pub group_id: Uuid,
    /// Match day, stored as `YYYY-MM-DD`.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Kick-off time, `HH:MM`.
    pub time: String,
    /// Capacity before confirmations are waitlisted.
    pub max_players: u32,
    /// Price charged to each participant.
    pub price_per_person: f64,
    /// Confirmation order, which doubles as the waitlist order.
    pub confirmed_ids: Vec<String>,
    /// Current draw, absent when teams are not drawn.
    #[serde(default)]
    pub teams: Option<TeamsEntity>,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Final score, zero before voting.
    #[serde(default)]
    pub score: ScoreEntity,
    /// Voter id to rating sheet (rated participant id to 1-5 score).
    #[serde(default)]
    pub votes: IndexMap<String, IndexMap<String, u8>>,
}
