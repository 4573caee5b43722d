use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        format_date,
        group::GroupSummary,
        user::UserSummary,
        validation::validate_vote_sheet,
    },
    services::{
        rating::{PlayerScore, SessionResult},
        roster::{waitlist_rank, waitlisted_count},
        team_draw::DrawMode,
    },
    state::{
        model::{Position, Session, TeamSide, User, UserId},
        state_machine::SessionStatus,
    },
};

/// Guest admission form. Missing fields take the documented defaults.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct GuestRequest {
    /// Display name of the guest.
    #[validate(length(min = 1, message = "guest name cannot be empty"))]
    pub name: String,
    /// Preferred position, midfielder when omitted.
    #[serde(default)]
    pub position: Option<Position>,
    /// Defaults to the configured guest rating.
    #[serde(default)]
    #[validate(range(min = 1.0, max = 5.0))]
    pub manual_rating: Option<f64>,
    /// Supported club, if any.
    #[serde(default)]
    pub heart_team: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
/// Strategy selection for a new draw.
pub struct DrawRequest {
    /// Strategy used to split the confirmed list.
    pub mode: DrawMode,
}

/// Final score entered by the organizer when voting opens.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct StartVotingRequest {
    /// Goals scored by team A.
    #[validate(range(min = 0, max = 4_294_967_295_i64))]
    pub team_a: i64,
    /// Goals scored by team B.
    #[validate(range(min = 0, max = 4_294_967_295_i64))]
    pub team_b: i64,
}

/// Rating sheet: rated participant identifier to a 1-5 score.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct VoteRequest {
    /// Scores keyed by rated participant identifier.
    #[validate(custom(function = "validate_vote_sheet"))]
    pub ratings: HashMap<String, u8>,
}

/// Final score of a session.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ScoreSummary {
    /// Goals scored by team A.
    pub team_a: u32,
    /// Goals scored by team B.
    pub team_b: u32,
}

/// One confirmed participant in confirmation order.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct RosterEntry {
    /// Participant identifier.
    pub user_id: String,
    /// Absent when the identifier no longer resolves to a user.
    pub name: Option<String>,
    /// Whether the participant is a guest.
    pub is_guest: bool,
    /// 1-based rank beyond capacity; absent for participants inside it.
    pub waitlist_rank: Option<usize>,
}

/// One side of a draw split into starters and bench.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TeamLineup {
    /// First `players_per_team` identifiers in positional order.
    pub starters: Vec<String>,
    /// Remaining identifiers.
    pub bench: Vec<String>,
}

/// Drawn teams of a session.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TeamsSummary {
    /// Team A lineup.
    pub team_a: TeamLineup,
    /// Team B lineup.
    pub team_b: TeamLineup,
}

/// Public projection of a session.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SessionSummary {
    /// Session identifier.
    pub id: Uuid,
    /// Owning group.
    pub group_id: Uuid,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Kick-off time, `HH:MM`.
    pub time: String,
    /// Capacity before participants are waitlisted.
    pub max_players: u32,
    /// Starters per side.
    pub players_per_team: u32,
    /// Price charged to each participant.
    pub price_per_person: f64,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Final score, zero until voting opens.
    pub score: ScoreSummary,
    /// Confirmed participants in confirmation order.
    pub confirmed: Vec<RosterEntry>,
    /// Number of confirmed participants beyond capacity.
    pub waitlisted_count: usize,
    /// Current draw, if any.
    pub teams: Option<TeamsSummary>,
    /// Voter identifier to their rating sheet.
    pub votes: BTreeMap<String, BTreeMap<String, u8>>,
}

impl SessionSummary {
    /// Project `session`, resolving participant names through `users`.
    pub fn project(session: &Session, users: &IndexMap<UserId, User>) -> Self {
        let confirmed = session
            .confirmed
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let user = users.get(id);
                RosterEntry {
                    user_id: id.to_string(),
                    name: user.map(|user| user.name.clone()),
                    is_guest: user.map_or_else(|| id.is_guest(), |user| user.is_guest),
                    waitlist_rank: waitlist_rank(index, session.max_players),
                }
            })
            .collect();

        let starters = session.players_per_team() as usize;
        let teams = session.teams.as_ref().map(|teams| {
            let lineup = |side: TeamSide| {
                let members = teams.side(side);
                let cut = starters.min(members.len());
                TeamLineup {
                    starters: members[..cut].iter().map(ToString::to_string).collect(),
                    bench: members[cut..].iter().map(ToString::to_string).collect(),
                }
            };
            TeamsSummary {
                team_a: lineup(TeamSide::A),
                team_b: lineup(TeamSide::B),
            }
        });

        let votes = session
            .votes
            .iter()
            .map(|(voter, sheet)| {
                let sheet = sheet
                    .iter()
                    .map(|(rated, score)| (rated.to_string(), *score))
                    .collect();
                (voter.to_string(), sheet)
            })
            .collect();

        Self {
            id: session.id,
            group_id: session.group_id,
            date: format_date(session.date),
            time: session.time.clone(),
            max_players: session.max_players,
            players_per_team: session.players_per_team(),
            price_per_person: session.price_per_person,
            status: session.status,
            score: ScoreSummary {
                team_a: session.score.team_a,
                team_b: session.score.team_b,
            },
            confirmed,
            waitlisted_count: waitlisted_count(session),
            teams,
            votes,
        }
    }
}

/// Mean peer score of one participant.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PlayerScoreSummary {
    /// Rated participant.
    pub user_id: String,
    /// Absent when the identifier no longer resolves to a user.
    pub name: Option<String>,
    /// Mean of the scores received.
    pub mean: f64,
    /// Number of scores received.
    pub vote_count: usize,
}

impl From<&PlayerScore> for PlayerScoreSummary {
    fn from(value: &PlayerScore) -> Self {
        Self {
            user_id: value.id.to_string(),
            name: value.user.as_ref().map(|user| user.name.clone()),
            mean: value.mean,
            vote_count: value.vote_count,
        }
    }
}

/// Ranked outcome of a session's votes.
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SessionResultSummary {
    /// Descending by mean, ties by identifier.
    pub players: Vec<PlayerScoreSummary>,
    /// Highest mean, if anyone was rated.
    pub top_performer: Option<PlayerScoreSummary>,
    /// Lowest mean, if anyone was rated.
    pub bottom_performer: Option<PlayerScoreSummary>,
}

impl From<&SessionResult> for SessionResultSummary {
    fn from(value: &SessionResult) -> Self {
        Self {
            players: value.players.iter().map(Into::into).collect(),
            top_performer: value.top_performer().map(Into::into),
            bottom_performer: value.bottom_performer().map(Into::into),
        }
    }
}

/// Guest user created by an admission together with the updated session.
#[derive(Debug, Serialize, ToSchema)]
pub struct GuestAdmission {
    /// The guest user just created.
    pub guest: UserSummary,
    /// Session with the guest confirmed.
    pub session: SessionSummary,
}

/// Everything touched by finalizing a session.
#[derive(Debug, Serialize, ToSchema)]
pub struct FinalizeResponse {
    /// The session that was just finalized.
    pub finished: SessionSummary,
    /// Next week's session.
    pub successor: SessionSummary,
    /// Group with its updated next session pointer.
    pub group: GroupSummary,
    /// Ranked vote outcome.
    pub result: SessionResultSummary,
    /// Users whose community rating changed.
    pub updated_users: Vec<UserSummary>,
}
