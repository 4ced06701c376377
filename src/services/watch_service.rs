//! Polling-based change observation for lobby snapshots.
//!
//! Storage backends expose no change feed, so dashboards and waiting rooms
//! observe a lobby by polling it on a fixed period and broadcasting only the
//! polls that actually changed something.

use std::time::Duration;

use tokio::{sync::broadcast, task::JoinHandle, time};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::{dao::models::LobbyEntity, state::SharedState};

/// Broadcast buffer depth; a subscriber this far behind starts lagging.
const CHANNEL_CAPACITY: usize = 16;

/// One observed change to a watched lobby.
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyUpdate {
    /// The lobby snapshot differs from the previous poll.
    Changed(LobbyEntity),
    /// The lobby disappeared from the store.
    Removed,
}

/// A background poller over one lobby code.
///
/// Subscribers receive a [`LobbyUpdate`] per observed change, including one
/// for the first successful poll. The polling task is aborted when the
/// watcher is dropped; outstanding subscriber streams then terminate.
pub struct LobbyWatcher {
    sender: broadcast::Sender<LobbyUpdate>,
    task: JoinHandle<()>,
}

impl LobbyWatcher {
    /// Watch `code` with the dashboard polling period.
    pub fn for_dashboard(state: &SharedState, code: impl Into<String>) -> Self {
        let period = state.config().dashboard_poll;
        Self::spawn(state.clone(), code.into(), period)
    }

    /// Watch `code` with the waiting-room polling period.
    pub fn for_waiting_room(state: &SharedState, code: impl Into<String>) -> Self {
        let period = state.config().waiting_room_poll;
        Self::spawn(state.clone(), code.into(), period)
    }

    /// Watch `code`, polling once per `period`.
    pub fn spawn(state: SharedState, code: String, period: Duration) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(poll_loop(state, code, period, sender.clone()));
        Self { sender, task }
    }

    /// Subscribe to updates observed after this call.
    pub fn subscribe(&self) -> BroadcastStream<LobbyUpdate> {
        BroadcastStream::new(self.sender.subscribe())
    }
}

impl Drop for LobbyWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_loop(
    state: SharedState,
    code: String,
    period: Duration,
    sender: broadcast::Sender<LobbyUpdate>,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    let mut last_seen: Option<LobbyEntity> = None;
    let mut was_present = false;

    loop {
        ticker.tick().await;

        let snapshot = match state.store().find_lobby(code.clone()).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                // Transient storage failures skip a tick instead of ending
                // the watch.
                warn!(%code, error = %err, "lobby poll failed");
                continue;
            }
        };

        match snapshot {
            Some(lobby) => {
                if last_seen.as_ref() != Some(&lobby) {
                    debug!(%code, status = %lobby.status, "lobby snapshot changed");
                    last_seen = Some(lobby.clone());
                    was_present = true;
                    // Send fails only with no live subscribers; keep polling
                    // so late subscribers still get future changes.
                    let _ = sender.send(LobbyUpdate::Changed(lobby));
                }
            }
            None => {
                if was_present {
                    debug!(%code, "watched lobby removed");
                    last_seen = None;
                    was_present = false;
                    let _ = sender.send(LobbyUpdate::Removed);
                }
            }
        }
    }
}
