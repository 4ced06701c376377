//! Read-only analytics facades over the session logs.
//!
//! Every query recomputes from the full record set; nothing is cached or
//! incrementally maintained.

use tracing::info;

use crate::{
    dao::models::{LobbyStatus, SessionRecordEntity},
    dto::analytics::{AggregateAnalytics, AnalyticsReport, LobbyAnalytics},
    error::ServiceError,
    services::{aggregation, lobby_service},
    state::SharedState,
};

/// How many records the global report lists as "recent".
const RECENT_SESSION_COUNT: usize = 10;

/// Global analytics over the standalone session log.
///
/// An empty log yields the all-zero/empty report rather than an error.
pub async fn get_analytics(state: &SharedState) -> Result<AnalyticsReport, ServiceError> {
    let sessions = state.store().list_sessions().await?;
    if sessions.is_empty() {
        return Ok(AnalyticsReport::default());
    }

    let total_score: u32 = sessions.iter().map(|record| record.score).sum();
    let total_possible: u32 = sessions.iter().map(|record| record.total_scenarios).sum();
    let average_percentage = if total_possible > 0 {
        f64::from(total_score) / f64::from(total_possible) * 100.0
    } else {
        0.0
    };

    Ok(AnalyticsReport {
        total_sessions: sessions.len() as u32,
        average_score: aggregation::round1(f64::from(total_score) / sessions.len() as f64),
        average_percentage: aggregation::round1(average_percentage),
        difficulty_stats: aggregation::difficulty_stats(&sessions),
        category_stats: aggregation::category_stats(&sessions),
        scenario_stats: aggregation::scenario_stats(&sessions),
        recent_sessions: recent_sessions(sessions),
    })
}

/// Analytics for one lobby, or `None` when the code is unknown.
pub async fn get_lobby_analytics(
    state: &SharedState,
    code: &str,
) -> Result<Option<LobbyAnalytics>, ServiceError> {
    let Some(lobby) = lobby_service::get_lobby(state, code).await? else {
        return Ok(None);
    };

    let sessions = &lobby.sessions;
    Ok(Some(LobbyAnalytics {
        lobby_info: (&lobby).into(),
        total_participants: lobby.participants.len() as u32,
        completed_count: sessions.len() as u32,
        average_score: aggregation::mean_score(sessions),
        average_percentage: aggregation::mean_percentage(sessions),
        category_stats: aggregation::category_stats(sessions),
        scenario_stats: aggregation::scenario_stats(sessions),
        participants: lobby.participants.clone(),
        sessions: lobby.sessions.clone(),
    }))
}

/// Analytics across the union of every lobby's sessions, with lobby-count
/// breakdowns and a difficulty breakdown keyed by lobby-level difficulty.
pub async fn get_aggregate_analytics(
    state: &SharedState,
) -> Result<AggregateAnalytics, ServiceError> {
    let lobbies = lobby_service::list_lobbies(state).await?;

    let all_sessions: Vec<SessionRecordEntity> = lobbies
        .iter()
        .flat_map(|lobby| lobby.sessions.iter().cloned())
        .collect();

    Ok(AggregateAnalytics {
        total_lobbies: lobbies.len() as u32,
        active_lobbies: lobbies
            .iter()
            .filter(|lobby| lobby.status == LobbyStatus::Active)
            .count() as u32,
        completed_lobbies: lobbies
            .iter()
            .filter(|lobby| lobby.status == LobbyStatus::Completed)
            .count() as u32,
        total_sessions: all_sessions.len() as u32,
        average_score: aggregation::mean_score(&all_sessions),
        average_percentage: aggregation::mean_percentage(&all_sessions),
        category_stats: aggregation::category_stats(&all_sessions),
        scenario_stats: aggregation::scenario_stats(&all_sessions),
        difficulty_stats: aggregation::lobby_difficulty_stats(&lobbies),
    })
}

/// Destructive wipe of the standalone session log; lobbies are untouched.
pub async fn clear_all_sessions(state: &SharedState) -> Result<(), ServiceError> {
    state.store().clear_sessions().await?;
    info!("cleared standalone session log");
    Ok(())
}

fn recent_sessions(mut sessions: Vec<SessionRecordEntity>) -> Vec<SessionRecordEntity> {
    sessions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    sessions.truncate(RECENT_SESSION_COUNT);
    sessions
}

#[cfg(test)]
mod tests {
    use std::{
        sync::Arc,
        time::{Duration, SystemTime},
    };

    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            lobby_store::memory::MemoryLobbyStore,
            models::{Difficulty, LobbyEntity},
        },
        dto::lobby::{CreateLobbyRequest, JoinLobbyRequest, ScenarioResultInput, SessionInput},
        services::{lobby_service, session_service},
        state::AppState,
    };

    fn test_state() -> SharedState {
        AppState::new(Arc::new(MemoryLobbyStore::new()), AppConfig::default())
    }

    fn session_input(difficulty: Difficulty, score: u32, total: u32) -> SessionInput {
        SessionInput {
            score,
            total_scenarios: total,
            difficulty: Some(difficulty),
            scenario_results: (0..total)
                .map(|i| ScenarioResultInput {
                    scenario_id: i + 1,
                    scenario_title: format!("Scenario {}", i + 1),
                    category: "phishing".into(),
                    is_correct: i < score,
                    choice_index: 1,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn empty_log_returns_zeroed_report() {
        let state = test_state();
        let report = get_analytics(&state).await.unwrap();

        assert_eq!(report.total_sessions, 0);
        assert_eq!(report.average_score, 0.0);
        assert_eq!(report.average_percentage, 0.0);
        assert!(report.difficulty_stats.is_empty());
        assert!(report.category_stats.is_empty());
        assert!(report.scenario_stats.is_empty());
        assert!(report.recent_sessions.is_empty());
    }

    #[tokio::test]
    async fn global_report_totals_and_rounding() {
        let state = test_state();
        session_service::save_session(&state, session_input(Difficulty::Beginner, 2, 5))
            .await
            .unwrap();
        session_service::save_session(&state, session_input(Difficulty::Beginner, 4, 5))
            .await
            .unwrap();

        let report = get_analytics(&state).await.unwrap();
        assert_eq!(report.total_sessions, 2);
        assert_eq!(report.average_score, 3.0);
        assert_eq!(report.average_percentage, 60.0);

        let bucket = &report.difficulty_stats[&Difficulty::Beginner];
        assert_eq!(bucket.count, 2);
        assert_eq!(bucket.total_score, 6);
        assert_eq!(bucket.total_possible, 10);
    }

    #[tokio::test]
    async fn recent_sessions_caps_at_ten_newest_first() {
        let state = test_state();
        let store = state.store();
        let base = SystemTime::now();

        for i in 0..12u32 {
            store
                .append_session(SessionRecordEntity {
                    id: Uuid::new_v4(),
                    username: None,
                    difficulty: Some(Difficulty::Beginner),
                    score: i.min(5),
                    total_scenarios: 5,
                    percentage: 0.0,
                    completed_at: base + Duration::from_secs(u64::from(i)),
                    scenario_results: Vec::new(),
                })
                .await
                .unwrap();
        }

        let report = get_analytics(&state).await.unwrap();
        assert_eq!(report.recent_sessions.len(), 10);
        assert!(
            report
                .recent_sessions
                .windows(2)
                .all(|pair| pair[0].completed_at >= pair[1].completed_at)
        );
    }

    #[tokio::test]
    async fn lobby_analytics_returns_none_for_unknown_code() {
        let state = test_state();
        assert!(
            get_lobby_analytics(&state, "ZZZZZZ")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn lobby_analytics_reflects_roster_and_sessions() {
        let state = test_state();
        let code = lobby_service::create_lobby(
            &state,
            CreateLobbyRequest {
                name: Some("Drill".into()),
                difficulty: Difficulty::Advanced,
                moderator_name: Some("morgan".into()),
                question_count: Some(5),
            },
        )
        .await
        .unwrap();

        for username in ["alice", "bob"] {
            lobby_service::join_lobby(
                &state,
                &code,
                JoinLobbyRequest {
                    username: username.into(),
                },
            )
            .await
            .unwrap();
        }
        session_service::start_lobby_session(&state, &code).await.unwrap();
        session_service::save_lobby_session(
            &state,
            &code,
            "alice",
            session_input(Difficulty::Advanced, 4, 5),
        )
        .await
        .unwrap();

        let analytics = get_lobby_analytics(&state, &code).await.unwrap().unwrap();
        assert_eq!(analytics.total_participants, 2);
        assert_eq!(analytics.completed_count, 1);
        assert_eq!(analytics.average_score, 4.0);
        assert_eq!(analytics.average_percentage, 80.0);
        assert_eq!(analytics.lobby_info.code, code);
        assert_eq!(analytics.category_stats["phishing"].attempts, 5);
    }

    #[tokio::test]
    async fn aggregate_groups_by_lobby_difficulty_and_counts_statuses() {
        let state = test_state();
        let store = state.store();

        let mut beginner = fixture("AAAAAA", Difficulty::Beginner);
        beginner.sessions.push(record(2, 5));
        beginner.sessions.push(record(4, 5));
        store.save_lobby(beginner).await.unwrap();

        let mut advanced = fixture("BBBBBB", Difficulty::Advanced);
        advanced.status = LobbyStatus::Completed;
        advanced.sessions.push(record(5, 5));
        store.save_lobby(advanced).await.unwrap();

        store
            .save_lobby(fixture("CCCCCC", Difficulty::Advanced))
            .await
            .unwrap();

        let aggregate = get_aggregate_analytics(&state).await.unwrap();
        assert_eq!(aggregate.total_lobbies, 3);
        assert_eq!(aggregate.active_lobbies, 2);
        assert_eq!(aggregate.completed_lobbies, 1);
        assert_eq!(aggregate.total_sessions, 3);

        let beginner_bucket = &aggregate.difficulty_stats[&Difficulty::Beginner];
        assert_eq!(beginner_bucket.count, 2);
        assert_eq!(beginner_bucket.average_score, 3.0);
        assert_eq!(beginner_bucket.average_percentage, 60.0);
        // The empty advanced lobby contributes no bucket rows.
        assert_eq!(aggregate.difficulty_stats[&Difficulty::Advanced].count, 1);
    }

    #[tokio::test]
    async fn clear_sessions_leaves_lobbies_untouched() {
        let state = test_state();
        let store = state.store();
        store
            .save_lobby(fixture("AAAAAA", Difficulty::Beginner))
            .await
            .unwrap();
        session_service::save_session(&state, session_input(Difficulty::Beginner, 1, 5))
            .await
            .unwrap();

        clear_all_sessions(&state).await.unwrap();

        assert_eq!(get_analytics(&state).await.unwrap().total_sessions, 0);
        assert_eq!(store.list_lobbies().await.unwrap().len(), 1);
    }

    fn fixture(code: &str, difficulty: Difficulty) -> LobbyEntity {
        LobbyEntity {
            code: code.into(),
            name: "Fixture".into(),
            difficulty,
            moderator_name: String::new(),
            question_count: 5,
            status: LobbyStatus::Active,
            created_at: SystemTime::now(),
            started_at: None,
            closed_at: None,
            participants: Vec::new(),
            sessions: Vec::new(),
        }
    }

    fn record(score: u32, total: u32) -> SessionRecordEntity {
        SessionRecordEntity {
            id: Uuid::new_v4(),
            username: Some("someone".into()),
            difficulty: None,
            score,
            total_scenarios: total,
            percentage: f64::from(score) / f64::from(total) * 100.0,
            completed_at: SystemTime::now(),
            scenario_results: Vec::new(),
        }
    }
}
