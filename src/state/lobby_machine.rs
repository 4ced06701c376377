use thiserror::Error;

use crate::dao::models::LobbyStatus;

/// Events that drive a lobby through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyEvent {
    /// Moderator starts the training run for everyone in the room.
    Start,
    /// Moderator closes the lobby, before or after the run.
    Close,
    /// Background sweep marks a stale lobby.
    Expire,
}

/// Error returned when attempting an invalid lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while {from:?}")]
pub struct InvalidTransition {
    /// The status the lobby was in when the invalid event was received.
    pub from: LobbyStatus,
    /// The event that cannot be applied from this status.
    pub event: LobbyEvent,
}

/// Why a join request was refused by the current lobby status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinRefusal {
    /// The lobby was swept as stale.
    #[error("lobby has expired")]
    Expired,
    /// The lobby was closed by its moderator.
    #[error("lobby is closed")]
    Closed,
    /// The run already started; late joins are not allowed.
    #[error("session already started")]
    AlreadyStarted,
}

/// Compute the next status for an event, rejecting invalid transitions.
///
/// `completed` and `expired` are terminal: no event leaves either status.
pub fn next_status(from: LobbyStatus, event: LobbyEvent) -> Result<LobbyStatus, InvalidTransition> {
    let next = match (from, event) {
        (LobbyStatus::Active, LobbyEvent::Start) => LobbyStatus::InProgress,
        // A moderator may close an active lobby directly, skipping the run.
        (LobbyStatus::Active, LobbyEvent::Close) => LobbyStatus::Completed,
        (LobbyStatus::Active, LobbyEvent::Expire) => LobbyStatus::Expired,
        (LobbyStatus::InProgress, LobbyEvent::Close) => LobbyStatus::Completed,
        (LobbyStatus::InProgress, LobbyEvent::Expire) => LobbyStatus::Expired,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

/// Gate deciding whether a new participant may join given the current status.
pub fn join_gate(status: LobbyStatus) -> Result<(), JoinRefusal> {
    match status {
        LobbyStatus::Active => Ok(()),
        LobbyStatus::Expired => Err(JoinRefusal::Expired),
        LobbyStatus::Completed => Err(JoinRefusal::Closed),
        LobbyStatus::InProgress => Err(JoinRefusal::AlreadyStarted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_then_close_happy_path() {
        let started = next_status(LobbyStatus::Active, LobbyEvent::Start).unwrap();
        assert_eq!(started, LobbyStatus::InProgress);

        let closed = next_status(started, LobbyEvent::Close).unwrap();
        assert_eq!(closed, LobbyStatus::Completed);
    }

    #[test]
    fn close_skips_the_run() {
        assert_eq!(
            next_status(LobbyStatus::Active, LobbyEvent::Close).unwrap(),
            LobbyStatus::Completed
        );
    }

    #[test]
    fn terminal_statuses_reject_every_event() {
        for from in [LobbyStatus::Completed, LobbyStatus::Expired] {
            for event in [LobbyEvent::Start, LobbyEvent::Close, LobbyEvent::Expire] {
                let err = next_status(from, event).unwrap_err();
                assert_eq!(err, InvalidTransition { from, event });
            }
        }
    }

    #[test]
    fn started_lobby_cannot_restart() {
        let err = next_status(LobbyStatus::InProgress, LobbyEvent::Start).unwrap_err();
        assert_eq!(err.from, LobbyStatus::InProgress);
        assert_eq!(err.event, LobbyEvent::Start);
    }

    #[test]
    fn join_gate_matches_status_table() {
        assert!(join_gate(LobbyStatus::Active).is_ok());
        assert_eq!(
            join_gate(LobbyStatus::InProgress),
            Err(JoinRefusal::AlreadyStarted)
        );
        assert_eq!(join_gate(LobbyStatus::Completed), Err(JoinRefusal::Closed));
        assert_eq!(join_gate(LobbyStatus::Expired), Err(JoinRefusal::Expired));
    }
}
