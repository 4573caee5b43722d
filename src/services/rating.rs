//! Rating model: effective ratings for balancing and aggregation of post-match
//! peer votes.

use std::{cmp::Ordering, collections::HashMap};

use indexmap::IndexMap;

use crate::state::model::{Session, User, UserId};

/// Mean peer score received by one participant in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerScore {
    /// Rated participant.
    pub id: UserId,
    /// Mean of the scores received.
    pub mean: f64,
    /// Number of scores received.
    pub vote_count: usize,
    /// `None` when the rated identifier no longer resolves to a user.
    pub user: Option<User>,
}

/// Ranked outcome of a session's votes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionResult {
    /// Sorted by descending mean, ties broken by ascending identifier.
    pub players: Vec<PlayerScore>,
}

impl SessionResult {
    /// Highest mean, if anyone was rated.
    pub fn top_performer(&self) -> Option<&PlayerScore> {
        self.players.first()
    }

    /// Lowest mean, if anyone was rated.
    pub fn bottom_performer(&self) -> Option<&PlayerScore> {
        self.players.last()
    }

    /// Whether nobody was rated.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Community rating when peers have voted at least once, else the manual one.
pub fn effective_rating(user: &User) -> f64 {
    user.community_rating.unwrap_or(user.manual_rating)
}

/// Average every score each participant received across all rating sheets.
pub fn aggregate_session_result(
    session: &Session,
    users: &IndexMap<UserId, User>,
) -> SessionResult {
    let mut totals: HashMap<&UserId, (u32, usize)> = HashMap::new();
    for sheet in session.votes.values() {
        for (rated, score) in sheet {
            let entry = totals.entry(rated).or_insert((0, 0));
            entry.0 += u32::from(*score);
            entry.1 += 1;
        }
    }

    let mut players: Vec<PlayerScore> = totals
        .into_iter()
        .map(|(id, (sum, count))| PlayerScore {
            id: id.clone(),
            mean: f64::from(sum) / count as f64,
            vote_count: count,
            user: users.get(id).cloned(),
        })
        .collect();

    players.sort_by(|a, b| {
        b.mean
            .partial_cmp(&a.mean)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    SessionResult { players }
}

/// One-step smoothing of the user's effective rating toward `session_mean`,
/// rounded to one decimal place.
pub fn update_community_rating(user: &User, session_mean: f64) -> f64 {
    round_to_tenth((effective_rating(user) + session_mean) / 2.0)
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
