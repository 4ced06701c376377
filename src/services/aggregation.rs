//! Pure, stateless aggregation over session records.
//!
//! Groups are only created on first occurrence, so every emitted bucket has
//! at least one contributing record and rate computations never divide by
//! zero. Empty input yields empty collections.

use indexmap::IndexMap;

use crate::{
    dao::models::{Difficulty, LobbyEntity, SessionRecordEntity},
    dto::analytics::{CategoryStats, DifficultyStats, ScenarioStats},
};

/// Round to one decimal place, as surfaced in the global analytics report.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of session scores; `0` for an empty input.
pub fn mean_score(records: &[SessionRecordEntity]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: u32 = records.iter().map(|record| record.score).sum();
    f64::from(total) / records.len() as f64
}

/// Mean of session percentages; `0` for an empty input.
pub fn mean_percentage(records: &[SessionRecordEntity]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: f64 = records.iter().map(|record| record.percentage).sum();
    total / records.len() as f64
}

/// Group records by their own difficulty; records without one are skipped.
pub fn difficulty_stats(
    records: &[SessionRecordEntity],
) -> IndexMap<Difficulty, DifficultyStats> {
    let mut stats: IndexMap<Difficulty, DifficultyStats> = IndexMap::new();

    for record in records {
        let Some(level) = record.difficulty else {
            continue;
        };
        let bucket = stats.entry(level).or_default();
        bucket.count += 1;
        bucket.total_score += record.score;
        bucket.total_possible += record.total_scenarios;
    }

    finalize_difficulty_averages(&mut stats);
    stats
}

/// Group every lobby's sessions by the lobby-level difficulty.
pub fn lobby_difficulty_stats(lobbies: &[LobbyEntity]) -> IndexMap<Difficulty, DifficultyStats> {
    let mut stats: IndexMap<Difficulty, DifficultyStats> = IndexMap::new();

    for lobby in lobbies {
        if lobby.sessions.is_empty() {
            continue;
        }
        let bucket = stats.entry(lobby.difficulty).or_default();
        for record in &lobby.sessions {
            bucket.count += 1;
            bucket.total_score += record.score;
            bucket.total_possible += record.total_scenarios;
        }
    }

    finalize_difficulty_averages(&mut stats);
    stats
}

fn finalize_difficulty_averages(stats: &mut IndexMap<Difficulty, DifficultyStats>) {
    for bucket in stats.values_mut() {
        if bucket.count > 0 {
            bucket.average_score = f64::from(bucket.total_score) / f64::from(bucket.count);
        }
        if bucket.total_possible > 0 {
            bucket.average_percentage =
                f64::from(bucket.total_score) / f64::from(bucket.total_possible) * 100.0;
        }
    }
}

/// Flatten scenario results and group them by category slug.
pub fn category_stats(records: &[SessionRecordEntity]) -> IndexMap<String, CategoryStats> {
    let mut stats: IndexMap<String, CategoryStats> = IndexMap::new();

    for record in records {
        for result in &record.scenario_results {
            let bucket = stats.entry(result.category.clone()).or_default();
            bucket.attempts += 1;
            if result.is_correct {
                bucket.correct += 1;
            } else {
                bucket.incorrect += 1;
            }
        }
    }

    for bucket in stats.values_mut() {
        bucket.success_rate = f64::from(bucket.correct) / f64::from(bucket.attempts) * 100.0;
    }

    stats
}

/// Flatten scenario results and group them by `(id, title)`, sorted
/// ascending by scenario id.
///
/// The title is part of the key so a content edit that reuses an id does not
/// merge statistics of unrelated scenarios.
pub fn scenario_stats(records: &[SessionRecordEntity]) -> Vec<ScenarioStats> {
    let mut stats: IndexMap<(u32, String), ScenarioStats> = IndexMap::new();

    for record in records {
        for result in &record.scenario_results {
            let key = (result.scenario_id, result.scenario_title.clone());
            let bucket = stats.entry(key).or_insert_with(|| ScenarioStats {
                scenario_id: result.scenario_id,
                scenario_title: result.scenario_title.clone(),
                category: result.category.clone(),
                attempts: 0,
                correct: 0,
                incorrect: 0,
                success_rate: 0.0,
            });
            bucket.attempts += 1;
            if result.is_correct {
                bucket.correct += 1;
            } else {
                bucket.incorrect += 1;
            }
        }
    }

    let mut stats: Vec<ScenarioStats> = stats
        .into_values()
        .map(|mut bucket| {
            bucket.success_rate = f64::from(bucket.correct) / f64::from(bucket.attempts) * 100.0;
            bucket
        })
        .collect();

    stats.sort_by_key(|bucket| bucket.scenario_id);
    stats
}
