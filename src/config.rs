//! Application-level configuration loading for the coordination engine.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the engine looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SECAWARE_CONFIG_PATH";

/// Default location of the JSON file backing the durable store.
const DEFAULT_STORE_PATH: &str = "data/secaware.json";
/// Lobbies older than this that never closed are marked expired.
const DEFAULT_LOBBY_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);
/// Moderator dashboard re-read interval.
const DEFAULT_DASHBOARD_POLL: Duration = Duration::from_millis(2_000);
/// Participant waiting-room re-read interval.
const DEFAULT_WAITING_ROOM_POLL: Duration = Duration::from_millis(1_500);
/// Failed PIN entries tolerated before locking the analytics view.
const DEFAULT_PIN_MAX_ATTEMPTS: u32 = 3;
/// How long the analytics view stays locked after too many failed attempts.
const DEFAULT_PIN_LOCKOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the engine.
pub struct AppConfig {
    /// Path of the JSON file used by the durable store backend.
    pub store_path: PathBuf,
    /// Age past which an unclosed lobby is swept to `expired`.
    pub lobby_expiry: Duration,
    /// Poll period for moderator dashboard watchers.
    pub dashboard_poll: Duration,
    /// Poll period for participant waiting-room watchers.
    pub waiting_room_poll: Duration,
    /// Failed PIN entries tolerated before a lockout starts.
    pub pin_max_attempts: u32,
    /// Duration of a PIN lockout window.
    pub pin_lockout: Duration,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded engine configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            lobby_expiry: DEFAULT_LOBBY_EXPIRY,
            dashboard_poll: DEFAULT_DASHBOARD_POLL,
            waiting_room_poll: DEFAULT_WAITING_ROOM_POLL,
            pin_max_attempts: DEFAULT_PIN_MAX_ATTEMPTS,
            pin_lockout: DEFAULT_PIN_LOCKOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file; every field is optional.
struct RawConfig {
    store_path: Option<PathBuf>,
    lobby_expiry_hours: Option<u64>,
    dashboard_poll_ms: Option<u64>,
    waiting_room_poll_ms: Option<u64>,
    pin_max_attempts: Option<u32>,
    pin_lockout_minutes: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            store_path: raw.store_path.unwrap_or(defaults.store_path),
            lobby_expiry: raw
                .lobby_expiry_hours
                .map(|hours| Duration::from_secs(hours * 60 * 60))
                .unwrap_or(defaults.lobby_expiry),
            dashboard_poll: raw
                .dashboard_poll_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.dashboard_poll),
            waiting_room_poll: raw
                .waiting_room_poll_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.waiting_room_poll),
            pin_max_attempts: raw.pin_max_attempts.unwrap_or(defaults.pin_max_attempts),
            pin_lockout: raw
                .pin_lockout_minutes
                .map(|minutes| Duration::from_secs(minutes * 60))
                .unwrap_or(defaults.pin_lockout),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
