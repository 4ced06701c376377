//! Recording of completed training attempts, lobby start and close.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{LobbyEntity, LobbyStatus, ParticipantStatus, SessionRecordEntity},
    dto::lobby::SessionInput,
    error::ServiceError,
    state::{SharedState, lobby_machine, lobby_machine::LobbyEvent},
};

/// Start the training run: `active → in_progress`, flipping every waiting
/// participant to `in_progress`.
pub async fn start_lobby_session(
    state: &SharedState,
    code: &str,
) -> Result<LobbyEntity, ServiceError> {
    let store = state.store();
    let mut lobby = store
        .find_lobby(code.to_owned())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{code}` not found")))?;

    lobby.status = lobby_machine::next_status(lobby.status, LobbyEvent::Start)?;
    lobby.started_at = Some(SystemTime::now());
    for participant in &mut lobby.participants {
        if participant.status == ParticipantStatus::Waiting {
            participant.status = ParticipantStatus::InProgress;
        }
    }

    store.save_lobby(lobby.clone()).await?;
    info!(%code, participants = lobby.participants.len(), "started lobby session");
    Ok(lobby)
}

/// Record a completed attempt inside a lobby.
///
/// The record is appended to the lobby's own session log and, with the
/// lobby's difficulty stamped on, to the standalone log as well, so the
/// attempt shows up in both the lobby and the global analytics. The matching
/// participant is marked `completed` with result fields populated; a missing
/// participant row does not fail the recording.
pub async fn save_lobby_session(
    state: &SharedState,
    code: &str,
    username: &str,
    input: SessionInput,
) -> Result<LobbyEntity, ServiceError> {
    let record = build_record(Some(username.to_owned()), &input)?;

    let store = state.store();
    let mut lobby = store
        .find_lobby(code.to_owned())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{code}` not found")))?;

    lobby.sessions.push(record.clone());

    if let Some(participant) = lobby
        .participants
        .iter_mut()
        .find(|participant| participant.username == username)
    {
        participant.status = ParticipantStatus::Completed;
        participant.score = Some(record.score);
        participant.total_scenarios = Some(record.total_scenarios);
        participant.percentage = Some(record.percentage);
        participant.completed_at = Some(record.completed_at);
    }

    let global_copy = SessionRecordEntity {
        difficulty: input.difficulty.or(Some(lobby.difficulty)),
        ..record
    };

    // Both writes must land; a failure on either is surfaced to the caller.
    store.save_lobby(lobby.clone()).await?;
    store.append_session(global_copy).await?;

    info!(%code, %username, "recorded lobby session");
    Ok(lobby)
}

/// Record a standalone (non-lobby) completed attempt in the global log.
pub async fn save_session(
    state: &SharedState,
    input: SessionInput,
) -> Result<SessionRecordEntity, ServiceError> {
    let record = build_record(None, &input)?;
    state.store().append_session(record.clone()).await?;
    info!(session_id = %record.id, "recorded standalone session");
    Ok(record)
}

/// Close a lobby: `active|in_progress → completed`. Closing an
/// already-completed lobby is a no-op.
pub async fn close_lobby(state: &SharedState, code: &str) -> Result<LobbyEntity, ServiceError> {
    let store = state.store();
    let mut lobby = store
        .find_lobby(code.to_owned())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{code}` not found")))?;

    if lobby.status == LobbyStatus::Completed {
        return Ok(lobby);
    }

    lobby.status = lobby_machine::next_status(lobby.status, LobbyEvent::Close)?;
    lobby.closed_at = Some(SystemTime::now());
    store.save_lobby(lobby.clone()).await?;

    info!(%code, "closed lobby");
    Ok(lobby)
}

/// Validate the input and build a record with the percentage recomputed
/// from its inputs, never trusted from the caller.
fn build_record(
    username: Option<String>,
    input: &SessionInput,
) -> Result<SessionRecordEntity, ServiceError> {
    input.validate()?;

    if input.scenario_results.len() != input.total_scenarios as usize {
        return Err(ServiceError::InvalidInput(format!(
            "expected {} scenario results, got {}",
            input.total_scenarios,
            input.scenario_results.len()
        )));
    }

    if input.score > input.total_scenarios {
        return Err(ServiceError::InvalidInput(
            "score cannot exceed the number of scenarios".into(),
        ));
    }

    Ok(SessionRecordEntity {
        id: Uuid::new_v4(),
        username,
        difficulty: input.difficulty,
        score: input.score,
        total_scenarios: input.total_scenarios,
        percentage: f64::from(input.score) / f64::from(input.total_scenarios) * 100.0,
        completed_at: SystemTime::now(),
        scenario_results: input
            .scenario_results
            .iter()
            .cloned()
            .map(Into::into)
            .collect(),
    })
}
