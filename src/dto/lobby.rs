use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{Difficulty, LobbyEntity, LobbyStatus, ScenarioResultEntity},
    dto::{format_system_time, validation::validate_username},
};

/// Payload used to create a new lobby.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLobbyRequest {
    /// Display name; when omitted the engine derives a dated default.
    #[serde(default)]
    #[validate(length(max = 80))]
    pub name: Option<String>,
    /// Difficulty shared by every run in the lobby.
    pub difficulty: Difficulty,
    /// Name of the moderator running the session.
    #[serde(default)]
    #[validate(length(max = 40))]
    pub moderator_name: Option<String>,
    /// Number of scenarios per participant; defaults when omitted.
    #[serde(default)]
    #[validate(range(min = 1, max = 50))]
    pub question_count: Option<u32>,
}

/// Payload used to join an existing lobby.
#[derive(Debug, Deserialize)]
pub struct JoinLobbyRequest {
    /// Requested username, unique within the lobby (case-sensitive).
    pub username: String,
}

impl Validate for JoinLobbyRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(err) = validate_username(&self.username) {
            errors.add("username", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Completed-attempt payload handed to the session recorder.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionInput {
    /// Correct-answer count.
    pub score: u32,
    /// Number of scenarios answered; one `scenario_results` entry each.
    #[validate(range(min = 1))]
    pub total_scenarios: u32,
    /// Difficulty of the run; lobby saves may omit it and inherit the
    /// lobby's own level.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Per-scenario outcomes in answer order.
    pub scenario_results: Vec<ScenarioResultInput>,
}

/// Outcome of one answered scenario inside a [`SessionInput`].
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioResultInput {
    /// Identifier of the scenario in the catalog.
    pub scenario_id: u32,
    /// Title at the time of the attempt.
    pub scenario_title: String,
    /// Category slug of the scenario.
    pub category: String,
    /// Whether the chosen answer was correct.
    pub is_correct: bool,
    /// Index of the chosen answer.
    pub choice_index: u32,
}

impl From<ScenarioResultInput> for ScenarioResultEntity {
    fn from(input: ScenarioResultInput) -> Self {
        Self {
            scenario_id: input.scenario_id,
            scenario_title: input.scenario_title,
            category: input.category,
            is_correct: input.is_correct,
            choice_index: input.choice_index,
        }
    }
}

/// Lobby metadata header returned with per-lobby analytics.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LobbyInfo {
    /// Six-character join code.
    pub code: String,
    /// Display name of the session.
    pub name: String,
    /// Difficulty shared by every run in the lobby.
    pub difficulty: Difficulty,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
    /// Current lifecycle status.
    pub status: LobbyStatus,
    /// Name of the moderator running the session.
    pub moderator_name: String,
}

impl From<&LobbyEntity> for LobbyInfo {
    fn from(lobby: &LobbyEntity) -> Self {
        Self {
            code: lobby.code.clone(),
            name: lobby.name.clone(),
            difficulty: lobby.difficulty,
            created_at: format_system_time(lobby.created_at),
            status: lobby.status,
            moderator_name: lobby.moderator_name.clone(),
        }
    }
}
