use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::dao::{
    lobby_store::LobbyStore,
    models::{LobbyEntity, PinStateEntity, SessionRecordEntity},
    storage::StorageResult,
};

/// In-process store keeping the whole namespace in memory.
///
/// Snapshot semantics match the durable backends: every read hands out
/// clones, so callers never hold a live reference into the store.
#[derive(Clone, Default)]
pub struct MemoryLobbyStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    lobbies: DashMap<String, LobbyEntity>,
    sessions: Mutex<Vec<SessionRecordEntity>>,
    pin: Mutex<Option<PinStateEntity>>,
}

impl MemoryLobbyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LobbyStore for MemoryLobbyStore {
    fn save_lobby(&self, lobby: LobbyEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.lobbies.insert(lobby.code.clone(), lobby);
            Ok(())
        })
    }

    fn find_lobby(&self, code: String) -> BoxFuture<'static, StorageResult<Option<LobbyEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.lobbies.get(&code).map(|entry| entry.clone())) })
    }

    fn list_lobbies(&self) -> BoxFuture<'static, StorageResult<Vec<LobbyEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .lobbies
                .iter()
                .map(|entry| entry.value().clone())
                .collect())
        })
    }

    fn append_session(&self, record: SessionRecordEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.sessions.lock().await.push(record);
            Ok(())
        })
    }

    fn list_sessions(&self) -> BoxFuture<'static, StorageResult<Vec<SessionRecordEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.sessions.lock().await.clone()) })
    }

    fn clear_sessions(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.sessions.lock().await.clear();
            Ok(())
        })
    }

    fn load_pin_state(&self) -> BoxFuture<'static, StorageResult<Option<PinStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.pin.lock().await.clone()) })
    }

    fn save_pin_state(&self, pin: PinStateEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            *store.inner.pin.lock().await = Some(pin);
            Ok(())
        })
    }
}
