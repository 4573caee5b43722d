//! Domain model for users, groups and sessions, plus conversions to and from
//! their persisted entities.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::Date;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{GroupEntity, ScoreEntity, SessionEntity, TeamsEntity, UserEntity},
    state::state_machine::SessionStatus,
};

const MEMBER_PREFIX: &str = "u_";
const GUEST_PREFIX: &str = "guest_";

/// Identifier of a participant. Guests and members live in distinct prefixes so
/// the two can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Allocate a fresh member identifier.
    pub fn member() -> Self {
        Self(format!("{MEMBER_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Allocate a fresh guest identifier.
    pub fn guest() -> Self {
        Self(format!("{GUEST_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Whether the identifier was allocated for a guest.
    pub fn is_guest(&self) -> bool {
        self.0.starts_with(GUEST_PREFIX)
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Preferred playing position. Unrecognised persisted values decode as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Goalkeeper.
    Goalkeeper,
    /// Defender.
    Defender,
    /// Midfielder, the default for new players and guests.
    #[default]
    Midfielder,
    /// Forward.
    Forward,
    /// Value not recognised when loading a snapshot.
    #[serde(other)]
    Unknown,
}

impl Position {
    /// Ordering key used to group a team from the goal outwards.
    pub fn priority(self) -> u8 {
        match self {
            Position::Goalkeeper => 0,
            Position::Defender => 1,
            Position::Midfielder => 2,
            Position::Forward => 3,
            Position::Unknown => 9,
        }
    }
}

/// Informational only; never used for balancing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DominantFoot {
    /// Right footed.
    #[default]
    Right,
    /// Left footed.
    Left,
    /// Comfortable with either foot.
    Both,
}

/// Registered member or guest participant.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Stable identifier, `u_` prefixed for members and `guest_` for guests.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalised login email; guests have none.
    pub email: Option<String>,
    /// Preferred position.
    pub position: Position,
    /// Self-declared rating in `[1, 5]`.
    pub manual_rating: f64,
    /// Peer-derived rating, absent until the first finalized session with votes.
    pub community_rating: Option<f64>,
    /// Supported club, used by the heart-team draw. `None` means no team.
    pub heart_team: Option<String>,
    /// Preferred foot.
    pub dominant_foot: DominantFoot,
    /// Photo URL or data URI.
    pub photo: Option<String>,
    /// Whether the user was admitted as a guest.
    pub is_guest: bool,
}

/// Recurring game organised by one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Group identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Sport label shown to members.
    pub sport: String,
    /// User who created the group.
    pub organizer_id: UserId,
    /// Kickoff time (`HH:MM`) used when the group was created.
    pub default_time: String,
    /// Price per person used when the group was created.
    pub default_price: f64,
    /// Capacity used when the group was created.
    pub default_max_players: u32,
    /// Upcoming `scheduled` or `voting` session.
    pub next_session_id: Uuid,
}

/// Selects one side of a [`Teams`] assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSide {
    /// First team, filled first by every draw strategy.
    A,
    /// Second team.
    B,
}

/// Partition of the confirmed list into two ordered teams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Teams {
    /// Team A, in positional order.
    pub team_a: Vec<UserId>,
    /// Team B, in positional order.
    pub team_b: Vec<UserId>,
}

impl Teams {
    /// Players assigned to `side`.
    pub fn side(&self, side: TeamSide) -> &[UserId] {
        match side {
            TeamSide::A => &self.team_a,
            TeamSide::B => &self.team_b,
        }
    }

    /// Number of players across both teams.
    pub fn len(&self) -> usize {
        self.team_a.len() + self.team_b.len()
    }

    /// Whether neither team has players.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Final score recorded when voting opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    /// Goals scored by team A.
    pub team_a: u32,
    /// Goals scored by team B.
    pub team_b: u32,
}

/// Rated participant to a 1-5 score.
pub type VoteSheet = IndexMap<UserId, u8>;

/// One dated occurrence of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Session identifier.
    pub id: Uuid,
    /// Owning group.
    pub group_id: Uuid,
    /// Calendar day of the match.
    pub date: Date,
    /// Kickoff time, `HH:MM`.
    pub time: String,
    /// Capacity; confirmations beyond it are waitlisted.
    pub max_players: u32,
    /// Price charged to each participant.
    pub price_per_person: f64,
    /// Participants in confirmation order, without duplicates.
    pub confirmed: Vec<UserId>,
    /// Current draw, always a partition of `confirmed`.
    pub teams: Option<Teams>,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Final score, zero until voting opens.
    pub score: Score,
    /// Rating sheets keyed by voter.
    pub votes: IndexMap<UserId, VoteSheet>,
}

impl Session {
    /// Fresh `scheduled` session with the given roster and no draw, score or votes.
    pub fn scheduled(
        group_id: Uuid,
        date: Date,
        time: String,
        max_players: u32,
        price_per_person: f64,
        confirmed: Vec<UserId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            date,
            time,
            max_players,
            price_per_person,
            confirmed,
            teams: None,
            status: SessionStatus::Scheduled,
            score: Score::default(),
            votes: IndexMap::new(),
        }
    }

    /// Players fielded per side; the rest of a team sits on the bench.
    pub fn players_per_team(&self) -> u32 {
        (self.max_players / 2).saturating_sub(1)
    }

    /// Whether `id` is on the confirmed list, waitlisted or not.
    pub fn is_confirmed(&self, id: &UserId) -> bool {
        self.confirmed.contains(id)
    }
}

impl From<UserEntity> for User {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            email: value.email,
            position: value.position,
            manual_rating: value.manual_rating,
            community_rating: value.community_rating,
            heart_team: value.heart_team,
            dominant_foot: value.dominant_foot,
            photo: value.photo,
            is_guest: value.is_guest,
        }
    }
}

impl From<&User> for UserEntity {
    fn from(value: &User) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
            email: value.email.clone(),
            position: value.position,
            manual_rating: value.manual_rating,
            community_rating: value.community_rating,
            heart_team: value.heart_team.clone(),
            dominant_foot: value.dominant_foot,
            photo: value.photo.clone(),
            is_guest: value.is_guest,
        }
    }
}

impl From<GroupEntity> for Group {
    fn from(value: GroupEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sport: value.sport,
            organizer_id: value.organizer_id.into(),
            default_time: value.default_time,
            default_price: value.default_price,
            default_max_players: value.default_max_players,
            next_session_id: value.next_session_id,
        }
    }
}

impl From<&Group> for GroupEntity {
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

fn ids_from(values: Vec<String>) -> Vec<UserId> {
    values.into_iter().map(UserId::from).collect()
}

fn ids_into(values: &[UserId]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

impl From<SessionEntity> for Session {
    fn from(value: SessionEntity) -> Self {
        Self {
            id: value.id,
            group_id: value.group_id,
            date: value.date,
            time: value.time,
            max_players: value.max_players,
            price_per_person: value.price_per_person,
            confirmed: ids_from(value.confirmed_ids),
            teams: value.teams.map(|teams| Teams {
                team_a: ids_from(teams.team_a),
                team_b: ids_from(teams.team_b),
            }),
            status: value.status,
            score: Score {
                team_a: value.score.team_a,
                team_b: value.score.team_b,
            },
            votes: value
                .votes
                .into_iter()
                .map(|(voter, sheet)| {
                    let sheet = sheet
                        .into_iter()
                        .map(|(rated, score)| (UserId::from(rated), score))
                        .collect();
                    (UserId::from(voter), sheet)
                })
                .collect(),
        }
    }
}

impl From<&Session> for SessionEntity {
    fn from(value: &Session) -> Self {
        Self {
            id: value.id,
            group_id: value.group_id,
            date: value.date,
            time: value.time.clone(),
            max_players: value.max_players,
            price_per_person: value.price_per_person,
            confirmed_ids: ids_into(&value.confirmed),
            teams: value.teams.as_ref().map(|teams| TeamsEntity {
                team_a: ids_into(&teams.team_a),
                team_b: ids_into(&teams.team_b),
            }),
            status: value.status,
            score: ScoreEntity {
                team_a: value.score.team_a,
                team_b: value.score.team_b,
            },
            votes: value
                .votes
                .iter()
                .map(|(voter, sheet)| {
                    let sheet = sheet
                        .iter()
                        .map(|(rated, score)| (rated.to_string(), *score))
                        .collect();
                    (voter.to_string(), sheet)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn guest_and_member_ids_are_distinguishable() {
        let member = UserId::member();
        let guest = UserId::guest();
        assert!(!member.is_guest());
        assert!(guest.is_guest());
        assert_ne!(UserId::guest(), guest);
    }

    #[test]
    fn players_per_team_is_half_capacity_minus_keeper() {
        let mut session = Session::scheduled(
            Uuid::new_v4(),
            date!(2024 - 06 - 01),
            "19:00".into(),
            14,
            10.0,
            Vec::new(),
        );
        assert_eq!(session.players_per_team(), 6);
        session.max_players = 11;
        assert_eq!(session.players_per_team(), 4);
        session.max_players = 1;
        assert_eq!(session.players_per_team(), 0);
    }

    #[test]
    fn unknown_position_strings_decode_as_unknown() {
        let position: Position = serde_json::from_str("\"libero\"").unwrap();
        assert_eq!(position, Position::Unknown);
        assert_eq!(position.priority(), 9);
        assert!(Position::Goalkeeper.priority() < Position::Forward.priority());
    }

    #[test]
    fn session_entity_conversion_keeps_votes_and_teams() {
        let mut session = Session::scheduled(
            Uuid::new_v4(),
            date!(2024 - 06 - 01),
            "19:00".into(),
            10,
            12.5,
            vec!["u_a".into(), "u_b".into()],
        );
        session.teams = Some(Teams {
            team_a: vec!["u_a".into()],
            team_b: vec!["u_b".into()],
        });
        session
            .votes
            .insert("u_a".into(), IndexMap::from([("u_b".into(), 4)]));

        let entity = SessionEntity::from(&session);
        assert_eq!(entity.confirmed_ids, vec!["u_a", "u_b"]);
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["date"], "2024-06-01");
        assert_eq!(json["status"], "scheduled");

        assert_eq!(Session::from(entity), session);
    }
}
