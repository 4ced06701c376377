use std::{fmt, time::SystemTime};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Difficulty level of a training run, also used as a lobby-level grouping key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Introductory scenarios.
    Beginner,
    /// Scenarios assuming basic awareness training.
    Intermediate,
    /// Scenarios aimed at experienced staff.
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        };
        f.write_str(label)
    }
}

/// Lifecycle status of a lobby; transitions are enforced by the lobby state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LobbyStatus {
    /// Accepting joins; the moderator has not started the run yet.
    Active,
    /// The run has started; joins are rejected, completions are recorded.
    InProgress,
    /// Closed by the moderator; terminal and read-only.
    Completed,
    /// Swept as stale; terminal and read-only.
    Expired,
}

impl fmt::Display for LobbyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LobbyStatus::Active => "active",
            LobbyStatus::InProgress => "in_progress",
            LobbyStatus::Completed => "completed",
            LobbyStatus::Expired => "expired",
        };
        f.write_str(label)
    }
}

/// Lifecycle status of one participant inside a lobby.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    /// Joined and waiting in the room for the moderator to start.
    Waiting,
    /// Currently taking the training run.
    InProgress,
    /// Finished the run; result fields are populated.
    Completed,
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ParticipantStatus::Waiting => "waiting",
            ParticipantStatus::InProgress => "in_progress",
            ParticipantStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// One user's membership and result record within a lobby.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticipantEntity {
    /// Display name, unique within the owning lobby (case-sensitive).
    pub username: String,
    /// When the participant joined the room.
    pub joined_at: SystemTime,
    /// Current lifecycle status.
    pub status: ParticipantStatus,
    /// Correct-answer count, populated on completion.
    pub score: Option<u32>,
    /// Number of scenarios answered, populated on completion.
    pub total_scenarios: Option<u32>,
    /// `score / total_scenarios * 100`, populated on completion.
    pub percentage: Option<f64>,
    /// When the attempt was recorded, populated on completion.
    pub completed_at: Option<SystemTime>,
}

impl ParticipantEntity {
    /// Build a fresh membership in the waiting state with empty result fields.
    pub fn joining(username: String) -> Self {
        Self {
            username,
            joined_at: SystemTime::now(),
            status: ParticipantStatus::Waiting,
            score: None,
            total_scenarios: None,
            percentage: None,
            completed_at: None,
        }
    }
}

/// Outcome of a single answered scenario inside a session record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioResultEntity {
    /// Identifier of the scenario in the catalog.
    pub scenario_id: u32,
    /// Title at the time of the attempt; part of the analytics grouping key
    /// so content edits reusing an id do not merge unrelated scenarios.
    pub scenario_title: String,
    /// Category slug of the scenario (e.g. `phishing`).
    pub category: String,
    /// Whether the chosen answer was the correct one.
    pub is_correct: bool,
    /// Index of the chosen answer within the scenario's choices.
    pub choice_index: u32,
}

/// One completed training attempt, standalone or nested inside a lobby.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecordEntity {
    /// Stable identifier for the record.
    pub id: Uuid,
    /// Participant username; absent for standalone attempts.
    pub username: Option<String>,
    /// Difficulty of the run; absent on lobby-nested copies where the
    /// owning lobby carries the level.
    pub difficulty: Option<Difficulty>,
    /// Correct-answer count.
    pub score: u32,
    /// Number of scenarios answered.
    pub total_scenarios: u32,
    /// Recomputed `score / total_scenarios * 100`, never trusted from input.
    pub percentage: f64,
    /// When the attempt finished.
    pub completed_at: SystemTime,
    /// Per-scenario outcomes, one entry per answered scenario.
    pub scenario_results: Vec<ScenarioResultEntity>,
}

/// A shared, code-identified training session persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LobbyEntity {
    /// Six-character join code from the restricted alphabet; unique at creation.
    pub code: String,
    /// Display name of the session.
    pub name: String,
    /// Difficulty shared by every run in this lobby.
    pub difficulty: Difficulty,
    /// Name of the moderator running the session; may be empty.
    pub moderator_name: String,
    /// Number of scenarios each participant answers.
    pub question_count: u32,
    /// Current lifecycle status.
    pub status: LobbyStatus,
    /// Creation timestamp, also the basis for the expiry sweep.
    pub created_at: SystemTime,
    /// Set when the moderator starts the run.
    pub started_at: Option<SystemTime>,
    /// Set when the lobby is closed.
    pub closed_at: Option<SystemTime>,
    /// Ordered roster, keyed by unique username.
    pub participants: Vec<ParticipantEntity>,
    /// Append-only log of completed attempts inside this lobby.
    pub sessions: Vec<SessionRecordEntity>,
}

impl LobbyEntity {
    /// Look up a participant by exact username.
    pub fn participant(&self, username: &str) -> Option<&ParticipantEntity> {
        self.participants
            .iter()
            .find(|participant| participant.username == username)
    }
}

/// Access-guard scalars persisted for the PIN-protected analytics view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PinStateEntity {
    /// Salted encoding of the PIN; `None` until a PIN is set.
    pub pin_hash: Option<String>,
    /// Consecutive failed verification attempts.
    pub attempt_count: u32,
    /// End of the current lockout window, if one is in force.
    pub lockout_until: Option<SystemTime>,
}
