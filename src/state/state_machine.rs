use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle status of a single session occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Roster is open; teams can be drawn and undone.
    #[default]
    Scheduled,
    /// Score is recorded and participants rate each other.
    Voting,
    /// Ratings have been applied and a successor session exists.
    Finished,
}

/// Events that move a session forward. Drawing and undoing teams are not
/// events: they never change the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Organizer records the final score and opens voting.
    StartVoting,
    /// Organizer closes voting and applies the rating updates.
    Finalize,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The status the session was in when the event was received.
    pub from: SessionStatus,
    /// The event that cannot be applied from this status.
    pub event: SessionEvent,
}

impl SessionStatus {
    /// Compute the status reached by applying `event`, rejecting anything that
    /// is not a forward step of `scheduled -> voting -> finished`.
    pub fn apply(self, event: SessionEvent) -> Result<SessionStatus, InvalidTransition> {
        let next = match (self, event) {
            (SessionStatus::Scheduled, SessionEvent::StartVoting) => SessionStatus::Voting,
            (SessionStatus::Voting, SessionEvent::Finalize) => SessionStatus::Finished,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }

    /// Whether confirmations, withdrawals, guests and draws are accepted.
    pub fn accepts_roster_changes(self) -> bool {
        matches!(self, SessionStatus::Scheduled)
    }

    /// Whether rating sheets can be submitted.
    pub fn accepts_votes(self) -> bool {
        matches!(self, SessionStatus::Voting)
    }

    /// Whether the session is finished and kept only as history.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_status_is_scheduled() {
        assert_eq!(SessionStatus::default(), SessionStatus::Scheduled);
    }

    #[test]
    fn full_happy_path_through_session() {
        let status = SessionStatus::Scheduled;
        let status = status.apply(SessionEvent::StartVoting).unwrap();
        assert_eq!(status, SessionStatus::Voting);
        let status = status.apply(SessionEvent::Finalize).unwrap();
        assert_eq!(status, SessionStatus::Finished);
        assert!(status.is_terminal());
    }

    #[test]
    fn finalize_requires_voting() {
        let err = SessionStatus::Scheduled
            .apply(SessionEvent::Finalize)
            .unwrap_err();
        assert_eq!(err.from, SessionStatus::Scheduled);
        assert_eq!(err.event, SessionEvent::Finalize);
    }

    #[test]
    fn finished_sessions_reject_every_event() {
        for event in [SessionEvent::StartVoting, SessionEvent::Finalize] {
            let err = SessionStatus::Finished.apply(event).unwrap_err();
            assert_eq!(
                err,
                InvalidTransition {
                    from: SessionStatus::Finished,
                    event
                }
            );
        }
    }

    #[test]
    fn voting_cannot_restart() {
        assert!(SessionStatus::Voting.apply(SessionEvent::StartVoting).is_err());
    }

    #[test]
    fn only_scheduled_sessions_accept_roster_changes() {
        assert!(SessionStatus::Scheduled.accepts_roster_changes());
        assert!(!SessionStatus::Voting.accepts_roster_changes());
        assert!(!SessionStatus::Finished.accepts_roster_changes());
        assert!(SessionStatus::Voting.accepts_votes());
        assert!(!SessionStatus::Scheduled.accepts_votes());
    }
}
