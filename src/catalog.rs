//! Read-only scenario catalog consumed as reference data.
//!
//! The engine never validates or mutates catalog content; it only hands it
//! to the embedding UI and uses category slugs for display names.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dao::models::Difficulty;

/// Default location on disk where the engine looks for the scenario catalog.
const DEFAULT_CATALOG_PATH: &str = "config/scenarios.json";
/// Environment variable that overrides [`DEFAULT_CATALOG_PATH`].
const CATALOG_PATH_ENV: &str = "SECAWARE_CATALOG_PATH";

/// One answer choice presented for a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
    /// Text of the answer.
    pub text: String,
    /// Whether this is the correct answer.
    pub is_correct: bool,
    /// Shown after answering to explain the right call.
    pub explanation: String,
    /// Narrative consequence of picking this answer.
    pub consequence: String,
}

/// A single situational question unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scenario {
    /// Identifier referenced by session records.
    pub id: u32,
    /// Display title.
    pub title: String,
    /// Category slug (e.g. `phishing`, `social-engineering`).
    pub category: String,
    /// The situation text presented to the user.
    pub situation: String,
    /// Ordered answer choices.
    pub choices: Vec<Choice>,
}

/// Static mapping from difficulty level to its ordered scenario list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioCatalog {
    #[serde(default)]
    scenarios: IndexMap<Difficulty, Vec<Scenario>>,
}

impl ScenarioCatalog {
    /// Load the catalog from disk, falling back to an empty catalog.
    pub fn load() -> Self {
        let path = resolve_catalog_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(catalog) => {
                    info!(
                        path = %path.display(),
                        levels = catalog.scenarios.len(),
                        "loaded scenario catalog"
                    );
                    catalog
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse scenario catalog; using empty catalog"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "scenario catalog not found; using empty catalog");
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read scenario catalog; using empty catalog"
                );
                Self::default()
            }
        }
    }

    /// Scenarios available at the given difficulty, in catalog order.
    pub fn for_difficulty(&self, difficulty: Difficulty) -> &[Scenario] {
        self.scenarios
            .get(&difficulty)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the catalog carries no scenarios at all.
    pub fn is_empty(&self) -> bool {
        self.scenarios.values().all(Vec::is_empty)
    }
}

/// Human-readable display name for a scenario category slug.
pub fn category_display_name(slug: &str) -> Option<&'static str> {
    let name = match slug {
        "phishing" => "Phishing",
        "password" => "Password Security",
        "social-engineering" => "Social Engineering",
        "network" => "Network Security",
        "physical" => "Physical Security",
        "incident-response" => "Incident Response",
        "authentication" => "Authentication",
        _ => return None,
    };
    Some(name)
}

/// Resolve the catalog path taking the environment override into account.
fn resolve_catalog_path() -> PathBuf {
    env::var_os(CATALOG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH))
}
