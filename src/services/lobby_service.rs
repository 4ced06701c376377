//! Lobby creation, membership, listing, and the expiry sweep.

use std::{sync::Arc, time::SystemTime};

use rand::Rng;
use time::OffsetDateTime;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dao::{
        lobby_store::LobbyStore,
        models::{LobbyEntity, LobbyStatus, ParticipantEntity},
    },
    dto::lobby::{CreateLobbyRequest, JoinLobbyRequest},
    error::ServiceError,
    state::{SharedState, lobby_machine},
};

/// Join-code alphabet; visually ambiguous characters (`0`, `1`, `I`, `O`) are excluded.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Join-code length.
const CODE_LENGTH: usize = 6;
/// Scenarios per participant when the creator does not pick a count.
const DEFAULT_QUESTION_COUNT: u32 = 10;

/// Create a new lobby and return its join code.
pub async fn create_lobby(
    state: &SharedState,
    request: CreateLobbyRequest,
) -> Result<String, ServiceError> {
    request.validate()?;

    let store = state.store();
    let code = generate_unique_code(&store).await?;

    let name = request
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(default_lobby_name);

    let lobby = LobbyEntity {
        code: code.clone(),
        name,
        difficulty: request.difficulty,
        moderator_name: request.moderator_name.unwrap_or_default(),
        question_count: request.question_count.unwrap_or(DEFAULT_QUESTION_COUNT),
        status: LobbyStatus::Active,
        created_at: SystemTime::now(),
        started_at: None,
        closed_at: None,
        participants: Vec::new(),
        sessions: Vec::new(),
    };

    store.save_lobby(lobby).await?;
    info!(%code, difficulty = %request.difficulty, "created lobby");
    Ok(code)
}

/// Fetch a lobby snapshot by code.
pub async fn get_lobby(
    state: &SharedState,
    code: &str,
) -> Result<Option<LobbyEntity>, ServiceError> {
    Ok(state.store().find_lobby(code.to_owned()).await?)
}

/// Join a lobby as a participant; the updated snapshot is returned.
pub async fn join_lobby(
    state: &SharedState,
    code: &str,
    request: JoinLobbyRequest,
) -> Result<LobbyEntity, ServiceError> {
    request.validate()?;

    let store = state.store();
    let mut lobby = store
        .find_lobby(code.to_owned())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{code}` not found")))?;

    lobby_machine::join_gate(lobby.status)?;

    if lobby.participant(&request.username).is_some() {
        return Err(ServiceError::InvalidInput(
            "username already taken in this lobby".into(),
        ));
    }

    lobby
        .participants
        .push(ParticipantEntity::joining(request.username.clone()));
    store.save_lobby(lobby.clone()).await?;

    info!(%code, username = %request.username, "participant joined lobby");
    Ok(lobby)
}

/// Remove a participant from a lobby; removing an absent username is a no-op.
pub async fn remove_participant(
    state: &SharedState,
    code: &str,
    username: &str,
) -> Result<(), ServiceError> {
    let store = state.store();
    let mut lobby = store
        .find_lobby(code.to_owned())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("lobby `{code}` not found")))?;

    let before = lobby.participants.len();
    lobby
        .participants
        .retain(|participant| participant.username != username);

    if lobby.participants.len() != before {
        store.save_lobby(lobby).await?;
        info!(%code, %username, "removed participant from lobby");
    }

    Ok(())
}

/// All lobbies, newest first.
pub async fn list_lobbies(state: &SharedState) -> Result<Vec<LobbyEntity>, ServiceError> {
    let mut lobbies = state.store().list_lobbies().await?;
    lobbies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(lobbies)
}

/// Mark every stale lobby as expired; returns how many were swept.
///
/// A lobby is stale once it is older than the configured expiry window and
/// not in a terminal status. The sweep is idempotent and is expected to run
/// opportunistically (e.g. on application start).
pub async fn sweep_expired_lobbies(state: &SharedState) -> Result<u32, ServiceError> {
    let store = state.store();
    let expiry = state.config().lobby_expiry;
    let mut swept = 0;

    for mut lobby in store.list_lobbies().await? {
        if matches!(lobby.status, LobbyStatus::Completed | LobbyStatus::Expired) {
            continue;
        }

        let stale = lobby
            .created_at
            .elapsed()
            .map(|age| age > expiry)
            .unwrap_or(false);
        if !stale {
            continue;
        }

        lobby.status = lobby_machine::next_status(lobby.status, lobby_machine::LobbyEvent::Expire)?;
        let code = lobby.code.clone();
        store.save_lobby(lobby).await?;
        warn!(%code, "swept stale lobby as expired");
        swept += 1;
    }

    Ok(swept)
}

/// Default display name carrying the creation date.
fn default_lobby_name() -> String {
    format!("Training Session - {}", OffsetDateTime::now_utc().date())
}

async fn generate_unique_code(store: &Arc<dyn LobbyStore>) -> Result<String, ServiceError> {
    loop {
        let code = random_code();
        if store.find_lobby(code.clone()).await?.is_none() {
            return Ok(code);
        }
    }
}

fn random_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| {
            let index = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[index] as char
        })
        .collect()
}
