use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    dao::models::{Difficulty, ParticipantEntity, SessionRecordEntity},
    dto::lobby::LobbyInfo,
};

/// Aggregate counters for one difficulty bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DifficultyStats {
    /// Number of contributing session records.
    pub count: u32,
    /// Sum of scores across the bucket.
    pub total_score: u32,
    /// Sum of answered-scenario counts across the bucket.
    pub total_possible: u32,
    /// `total_score / count`.
    pub average_score: f64,
    /// `total_score / total_possible * 100`.
    pub average_percentage: f64,
}

/// Aggregate counters for one scenario category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    /// Answered scenarios contributing to this category.
    pub attempts: u32,
    /// Correctly answered.
    pub correct: u32,
    /// Incorrectly answered.
    pub incorrect: u32,
    /// `correct / attempts * 100`.
    pub success_rate: f64,
}

/// Aggregate counters for one scenario, keyed by `(id, title)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioStats {
    /// Identifier of the scenario in the catalog.
    pub scenario_id: u32,
    /// Title at the time of the attempts.
    pub scenario_title: String,
    /// Category slug of the scenario.
    pub category: String,
    /// Times this scenario was answered.
    pub attempts: u32,
    /// Correctly answered.
    pub correct: u32,
    /// Incorrectly answered.
    pub incorrect: u32,
    /// `correct / attempts * 100`.
    pub success_rate: f64,
}

/// Global analytics computed over the standalone session log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsReport {
    /// Total recorded sessions.
    pub total_sessions: u32,
    /// Mean score across sessions, rounded to one decimal place.
    pub average_score: f64,
    /// `Σscore / Σtotal * 100`, rounded to one decimal place.
    pub average_percentage: f64,
    /// Per-difficulty breakdown, first-occurrence order.
    pub difficulty_stats: IndexMap<Difficulty, DifficultyStats>,
    /// Per-category breakdown, first-occurrence order.
    pub category_stats: IndexMap<String, CategoryStats>,
    /// Per-scenario breakdown, ascending by scenario id.
    pub scenario_stats: Vec<ScenarioStats>,
    /// The ten most recently completed sessions, newest first.
    pub recent_sessions: Vec<SessionRecordEntity>,
}

/// Analytics for a single lobby, including its live roster.
#[derive(Debug, Clone, Serialize)]
pub struct LobbyAnalytics {
    /// Lobby metadata header.
    pub lobby_info: LobbyInfo,
    /// Current roster size.
    pub total_participants: u32,
    /// Completed attempts recorded in the lobby.
    pub completed_count: u32,
    /// Mean score over the lobby's sessions.
    pub average_score: f64,
    /// Mean session percentage over the lobby's sessions.
    pub average_percentage: f64,
    /// Per-category breakdown of the lobby's sessions.
    pub category_stats: IndexMap<String, CategoryStats>,
    /// Per-scenario breakdown of the lobby's sessions.
    pub scenario_stats: Vec<ScenarioStats>,
    /// Snapshot of the roster at query time.
    pub participants: Vec<ParticipantEntity>,
    /// The lobby's completed attempts.
    pub sessions: Vec<SessionRecordEntity>,
}

/// Analytics computed across the union of every lobby's sessions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateAnalytics {
    /// Lobbies present in the store, regardless of status.
    pub total_lobbies: u32,
    /// Lobbies currently accepting joins.
    pub active_lobbies: u32,
    /// Lobbies closed by their moderator.
    pub completed_lobbies: u32,
    /// Sessions across every lobby.
    pub total_sessions: u32,
    /// Mean score over all lobby sessions.
    pub average_score: f64,
    /// Mean session percentage over all lobby sessions.
    pub average_percentage: f64,
    /// Per-category breakdown over all lobby sessions.
    pub category_stats: IndexMap<String, CategoryStats>,
    /// Per-scenario breakdown over all lobby sessions.
    pub scenario_stats: Vec<ScenarioStats>,
    /// Breakdown keyed by lobby-level difficulty; lobby-nested records may
    /// omit a per-record level, so the lobby's own difficulty groups them.
    pub difficulty_stats: IndexMap<Difficulty, DifficultyStats>,
}
