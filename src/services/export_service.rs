//! CSV and JSON export views over lobbies and analytics.
//!
//! The CSV exports are report-style documents (header block, then one or
//! more tables) rather than a single flat table, mirroring what moderators
//! hand to trainers after a session.

use std::fmt::Write as _;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;

use crate::{
    dao::models::LobbyEntity,
    dto::format_system_time,
    error::ServiceError,
    services::{aggregation, lobby_service},
    state::SharedState,
};

/// Render one lobby as a CSV report, or `None` when the code is unknown.
///
/// The report carries a lobby header block, a participant roster table, and,
/// when any attempts were recorded, a per-answer detail table.
pub async fn export_lobby_csv(
    state: &SharedState,
    code: &str,
) -> Result<Option<String>, ServiceError> {
    let Some(lobby) = lobby_service::get_lobby(state, code).await? else {
        return Ok(None);
    };

    let mut csv = String::new();
    let _ = writeln!(csv, "Lobby: {}", lobby.name);
    let _ = writeln!(csv, "Code: {}", lobby.code);
    let _ = writeln!(csv, "Difficulty: {}", lobby.difficulty);
    let _ = writeln!(csv, "Created: {}", format_system_time(lobby.created_at));
    let _ = writeln!(csv, "Status: {}", lobby.status);
    csv.push('\n');

    csv.push_str("Username,Score,Total Scenarios,Percentage,Completed At,Status\n");
    for participant in &lobby.participants {
        let completed_at = participant
            .completed_at
            .map(format_system_time)
            .unwrap_or_else(|| "Not completed".to_owned());
        let _ = writeln!(
            csv,
            "{},{},{},{}%,{},{}",
            participant.username,
            opt_cell(participant.score),
            opt_cell(participant.total_scenarios),
            participant
                .percentage
                .map(|p| format!("{p:.2}"))
                .unwrap_or_else(|| "N/A".to_owned()),
            completed_at,
            participant.status,
        );
    }

    if !lobby.sessions.is_empty() {
        csv.push_str("\n\nDetailed Scenario Results\n");
        csv.push_str("Username,Scenario,Category,Result,Choice Index\n");
        for session in &lobby.sessions {
            let username = session.username.as_deref().unwrap_or("anonymous");
            for result in &session.scenario_results {
                let _ = writeln!(
                    csv,
                    "{},\"{}\",{},{},{}",
                    username,
                    result.scenario_title,
                    result.category,
                    if result.is_correct { "Correct" } else { "Incorrect" },
                    result.choice_index,
                );
            }
        }
    }

    info!(%code, "exported lobby CSV report");
    Ok(Some(csv))
}

/// Render every lobby as one CSV report: a per-lobby summary table followed
/// by a flat table of every recorded attempt.
pub async fn export_all_lobbies_csv(state: &SharedState) -> Result<String, ServiceError> {
    let lobbies = lobby_service::list_lobbies(state).await?;

    let mut csv = String::from("All Lobbies Summary\n\n");
    csv.push_str(
        "Lobby Code,Lobby Name,Difficulty,Created At,Participants,Completed,Avg Score %,Status\n",
    );
    for lobby in &lobbies {
        let _ = writeln!(
            csv,
            "{},\"{}\",{},{},{},{},{}%,{}",
            lobby.code,
            lobby.name,
            lobby.difficulty,
            format_system_time(lobby.created_at),
            lobby.participants.len(),
            lobby.sessions.len(),
            average_percentage_cell(lobby),
            lobby.status,
        );
    }

    csv.push_str("\n\nDetailed Results by Lobby\n");
    csv.push_str("Lobby Code,Lobby Name,Username,Score,Percentage,Completed At\n");
    for lobby in &lobbies {
        for session in &lobby.sessions {
            let _ = writeln!(
                csv,
                "{},\"{}\",{},{}/{},{:.2}%,{}",
                lobby.code,
                lobby.name,
                session.username.as_deref().unwrap_or("anonymous"),
                session.score,
                session.total_scenarios,
                session.percentage,
                format_system_time(session.completed_at),
            );
        }
    }

    info!(lobbies = lobbies.len(), "exported all-lobbies CSV report");
    Ok(csv)
}

/// Pretty-print any analytics payload for a JSON download.
pub fn analytics_json<T: Serialize>(payload: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(payload)
}

/// Suggested download name for a single-lobby CSV report.
pub fn lobby_export_filename(code: &str) -> String {
    format!("lobby-{code}-{}.csv", OffsetDateTime::now_utc().date())
}

/// Suggested download name for the all-lobbies CSV report.
pub fn all_lobbies_export_filename() -> String {
    format!("all-lobbies-{}.csv", OffsetDateTime::now_utc().date())
}

/// Suggested download name for a single-lobby analytics JSON payload.
pub fn lobby_analytics_filename(code: &str) -> String {
    format!(
        "lobby-{code}-analytics-{}.json",
        OffsetDateTime::now_utc().date()
    )
}

/// Suggested download name for the aggregate analytics JSON payload.
pub fn aggregate_analytics_filename() -> String {
    format!(
        "aggregate-analytics-{}.json",
        OffsetDateTime::now_utc().date()
    )
}

fn opt_cell(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_owned())
}

fn average_percentage_cell(lobby: &LobbyEntity) -> String {
    if lobby.sessions.is_empty() {
        "0".to_owned()
    } else {
        format!("{:.2}", aggregation::mean_percentage(&lobby.sessions))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{lobby_store::memory::MemoryLobbyStore, models::Difficulty},
        dto::lobby::{CreateLobbyRequest, JoinLobbyRequest, ScenarioResultInput, SessionInput},
        services::{analytics_service, session_service},
        state::AppState,
    };

    fn test_state() -> SharedState {
        AppState::new(Arc::new(MemoryLobbyStore::new()), AppConfig::default())
    }

    async fn populated_lobby(state: &SharedState) -> String {
        let code = lobby_service::create_lobby(
            state,
            CreateLobbyRequest {
                name: Some("Phishing, advanced".into()),
                difficulty: Difficulty::Advanced,
                moderator_name: Some("morgan".into()),
                question_count: Some(2),
            },
        )
        .await
        .unwrap();

        for username in ["alice", "bob"] {
            lobby_service::join_lobby(
                state,
                &code,
                JoinLobbyRequest {
                    username: username.into(),
                },
            )
            .await
            .unwrap();
        }
        session_service::start_lobby_session(state, &code).await.unwrap();
        session_service::save_lobby_session(
            state,
            &code,
            "alice",
            SessionInput {
                score: 1,
                total_scenarios: 2,
                difficulty: None,
                scenario_results: vec![
                    ScenarioResultInput {
                        scenario_id: 1,
                        scenario_title: "Invoice from \"IT\"".into(),
                        category: "phishing".into(),
                        is_correct: true,
                        choice_index: 0,
                    },
                    ScenarioResultInput {
                        scenario_id: 2,
                        scenario_title: "Tailgater".into(),
                        category: "physical".into(),
                        is_correct: false,
                        choice_index: 2,
                    },
                ],
            },
        )
        .await
        .unwrap();

        code
    }

    #[tokio::test]
    async fn unknown_lobby_exports_nothing() {
        let state = test_state();
        assert!(export_lobby_csv(&state, "ZZZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lobby_report_carries_header_roster_and_details() {
        let state = test_state();
        let code = populated_lobby(&state).await;

        let csv = export_lobby_csv(&state, &code).await.unwrap().unwrap();

        assert!(csv.starts_with("Lobby: Phishing, advanced\n"));
        assert!(csv.contains(&format!("Code: {code}\n")));
        assert!(csv.contains("Difficulty: advanced\n"));
        assert!(csv.contains("Username,Score,Total Scenarios,Percentage,Completed At,Status\n"));
        assert!(csv.contains("alice,1,2,50.00%,"));
        assert!(csv.contains("bob,N/A,N/A,N/A%,Not completed,in_progress\n"));
        assert!(csv.contains("Detailed Scenario Results\n"));
        assert!(csv.contains("alice,\"Tailgater\",physical,Incorrect,2\n"));
    }

    #[tokio::test]
    async fn roster_only_lobby_omits_the_detail_table() {
        let state = test_state();
        let code = lobby_service::create_lobby(
            &state,
            CreateLobbyRequest {
                name: Some("Empty drill".into()),
                difficulty: Difficulty::Beginner,
                moderator_name: None,
                question_count: None,
            },
        )
        .await
        .unwrap();

        let csv = export_lobby_csv(&state, &code).await.unwrap().unwrap();
        assert!(!csv.contains("Detailed Scenario Results"));
    }

    #[tokio::test]
    async fn all_lobbies_report_summarizes_each_lobby() {
        let state = test_state();
        let code = populated_lobby(&state).await;

        let csv = export_all_lobbies_csv(&state).await.unwrap();

        assert!(csv.starts_with("All Lobbies Summary\n\n"));
        assert!(csv.contains(&format!(
            "{code},\"Phishing, advanced\",advanced,"
        )));
        // 2 participants, 1 completed session at 50%.
        assert!(csv.contains(",2,1,50.00%,in_progress\n"));
        assert!(csv.contains("Detailed Results by Lobby\n"));
        assert!(csv.contains(&format!("{code},\"Phishing, advanced\",alice,1/2,50.00%,")));
    }

    #[tokio::test]
    async fn empty_store_still_yields_both_table_headers() {
        let state = test_state();
        let csv = export_all_lobbies_csv(&state).await.unwrap();
        assert!(csv.contains("Lobby Code,Lobby Name,Difficulty,"));
        assert!(csv.contains("Lobby Code,Lobby Name,Username,Score,Percentage,Completed At\n"));
    }

    #[tokio::test]
    async fn analytics_payload_serializes_pretty() {
        let state = test_state();
        populated_lobby(&state).await;

        let aggregate = analytics_service::get_aggregate_analytics(&state).await.unwrap();
        let json = analytics_json(&aggregate).unwrap();

        assert!(json.contains("\"total_lobbies\": 1"));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["total_sessions"], 1);
    }

    #[test]
    fn filenames_are_dated() {
        let date = OffsetDateTime::now_utc().date().to_string();
        assert_eq!(
            lobby_export_filename("ABC234"),
            format!("lobby-ABC234-{date}.csv")
        );
        assert_eq!(
            all_lobbies_export_filename(),
            format!("all-lobbies-{date}.csv")
        );
        assert_eq!(
            lobby_analytics_filename("ABC234"),
            format!("lobby-ABC234-analytics-{date}.json")
        );
        assert_eq!(
            aggregate_analytics_filename(),
            format!("aggregate-analytics-{date}.json")
        );
    }
}
