//! Shared application state and the lobby lifecycle state machine.

/// Lobby status transition rules and join gating.
pub mod lobby_machine;

use std::sync::Arc;

pub use self::lobby_machine::{InvalidTransition, JoinRefusal, LobbyEvent};

use crate::{config::AppConfig, dao::lobby_store::LobbyStore};

/// Cheaply cloneable handle to the shared application state.
pub type SharedState = Arc<AppState>;

/// Central application state bundling the persistent store and runtime
/// configuration.
///
/// Services never cache entities here: the store is the sole durable owner,
/// and every viewer re-reads its own disposable snapshot.
pub struct AppState {
    store: Arc<dyn LobbyStore>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn LobbyStore>, config: AppConfig) -> SharedState {
        Arc::new(Self { store, config })
    }

    /// Obtain a handle to the persistent store.
    pub fn store(&self) -> Arc<dyn LobbyStore> {
        self.store.clone()
    }

    /// Borrow the runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
