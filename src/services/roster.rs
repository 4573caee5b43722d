//! Roster manager: presence confirmation, withdrawal and guest admission on a
//! single session, plus the waitlist projection of the confirmed list.

use tracing::warn;

use crate::{
    error::ServiceError,
    state::model::{Position, Session, User, UserId},
};

/// Append `user_id` to the confirmed list unless already present.
///
/// Returns `true` when the roster changed. A change discards any existing
/// draw so teams never reference a roster they were not drawn from.
pub fn confirm(session: &mut Session, user_id: &UserId) -> Result<bool, ServiceError> {
    ensure_roster_open(session)?;
    if session.is_confirmed(user_id) {
        return Ok(false);
    }

    session.confirmed.push(user_id.clone());
    invalidate_draw(session);
    Ok(true)
}

/// Remove `user_id` from the confirmed list. Absent users are a no-op.
pub fn withdraw(session: &mut Session, user_id: &UserId) -> Result<bool, ServiceError> {
    ensure_roster_open(session)?;
    let before = session.confirmed.len();
    session.confirmed.retain(|id| id != user_id);
    if session.confirmed.len() == before {
        return Ok(false);
    }

    invalidate_draw(session);
    Ok(true)
}

/// Waitlist rank of the participant at `index` of the confirmed list, 1-based.
/// `None` while the index is inside the capacity.
pub fn waitlist_rank(index: usize, capacity: u32) -> Option<usize> {
    let capacity = capacity as usize;
    (index >= capacity).then(|| index - capacity + 1)
}

/// Number of confirmed participants beyond the capacity.
pub fn waitlisted_count(session: &Session) -> usize {
    session
        .confirmed
        .len()
        .saturating_sub(session.max_players as usize)
}

/// Profile of a non-registered participant added by another user.
#[derive(Debug, Clone, PartialEq)]
pub struct GuestProfile {
    /// Display name; must not be blank.
    pub name: String,
    /// Preferred position.
    pub position: Position,
    /// Rating in `[1, 5]`.
    pub manual_rating: f64,
    /// Supported club, if any.
    pub heart_team: Option<String>,
}

/// Build the user record for a guest. Guests carry no email and no community
/// rating and are never allowed to log in.
pub fn new_guest(profile: GuestProfile) -> Result<User, ServiceError> {
    let name = profile.name.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("guest name cannot be empty".into()));
    }
    if !(1.0..=5.0).contains(&profile.manual_rating) {
        return Err(ServiceError::InvalidInput(format!(
            "guest rating must be between 1 and 5 (got {})",
            profile.manual_rating
        )));
    }

    Ok(User {
        id: UserId::guest(),
        name: name.to_string(),
        email: None,
        position: profile.position,
        manual_rating: profile.manual_rating,
        community_rating: None,
        heart_team: profile
            .heart_team
            .map(|team| team.trim().to_string())
            .filter(|team| !team.is_empty()),
        dominant_foot: Default::default(),
        photo: None,
        is_guest: true,
    })
}

fn ensure_roster_open(session: &Session) -> Result<(), ServiceError> {
    if session.status.accepts_roster_changes() {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "roster of session `{}` is locked while {:?}",
            session.id, session.status
        )))
    }
}

fn invalidate_draw(session: &mut Session) {
    if session.teams.take().is_some() {
        warn!(session_id = %session.id, "roster changed; previous draw discarded");
    }
}
