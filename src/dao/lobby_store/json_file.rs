use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};
use tracing::warn;

use crate::dao::{
    lobby_store::LobbyStore,
    models::{LobbyEntity, PinStateEntity, SessionRecordEntity},
    storage::{StorageError, StorageResult},
};

/// Durable backend keeping the whole namespace in one JSON document on disk,
/// mirroring the origin-scoped key-value layout of the hosting runtime.
///
/// Every mutation re-reads the document, applies the change, and writes the
/// document back under a write lock, so mutations within one process are
/// serialized.
#[derive(Clone, Debug)]
pub struct JsonFileLobbyStore {
    path: Arc<PathBuf>,
    write_gate: Arc<Mutex<()>>,
}

/// On-disk document shape. Missing keys decode to their empty values so a
/// partially written or hand-edited file degrades to "no data".
#[derive(Debug, Default, Serialize, Deserialize)]
struct Namespace {
    #[serde(default)]
    lobbies: IndexMap<String, LobbyEntity>,
    #[serde(default)]
    sessions: Vec<SessionRecordEntity>,
    #[serde(default)]
    pin: Option<PinStateEntity>,
}

impl JsonFileLobbyStore {
    /// Open a store backed by the given file, creating parent directories.
    pub async fn open(path: PathBuf) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|source| {
                StorageError::unavailable(
                    format!("creating store directory `{}`", parent.display()),
                    source,
                )
            })?;
        }

        let store = Self {
            path: Arc::new(path),
            write_gate: Arc::new(Mutex::new(())),
        };

        // Fail fast on an unreadable or corrupt document.
        store.load().await?;
        Ok(store)
    }

    async fn load(&self) -> StorageResult<Namespace> {
        let contents = match fs::read_to_string(self.path.as_ref()).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Namespace::default()),
            Err(source) => {
                return Err(StorageError::unavailable(
                    format!("reading store file `{}`", self.path.display()),
                    source,
                ));
            }
        };

        serde_json::from_str(&contents).map_err(|source| {
            warn!(path = %self.path.display(), error = %source, "store file is corrupt");
            StorageError::serialization(
                format!("decoding store file `{}`", self.path.display()),
                source,
            )
        })
    }

    async fn persist(&self, namespace: &Namespace) -> StorageResult<()> {
        let encoded = serde_json::to_string_pretty(namespace).map_err(|source| {
            StorageError::serialization(
                format!("encoding store file `{}`", self.path.display()),
                source,
            )
        })?;

        fs::write(self.path.as_ref(), encoded).await.map_err(|source| {
            StorageError::unavailable(
                format!("writing store file `{}`", self.path.display()),
                source,
            )
        })
    }
}

impl LobbyStore for JsonFileLobbyStore {
    fn save_lobby(&self, lobby: LobbyEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let _gate = store.write_gate.lock().await;
            let mut namespace = store.load().await?;
            namespace.lobbies.insert(lobby.code.clone(), lobby);
            store.persist(&namespace).await
        })
    }

    fn find_lobby(&self, code: String) -> BoxFuture<'static, StorageResult<Option<LobbyEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.load().await?.lobbies.get(&code).cloned()) })
    }

    fn list_lobbies(&self) -> BoxFuture<'static, StorageResult<Vec<LobbyEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.load().await?.lobbies.into_values().collect()) })
    }

    fn append_session(&self, record: SessionRecordEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let _gate = store.write_gate.lock().await;
            let mut namespace = store.load().await?;
            namespace.sessions.push(record);
            store.persist(&namespace).await
        })
    }

    fn list_sessions(&self) -> BoxFuture<'static, StorageResult<Vec<SessionRecordEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.load().await?.sessions) })
    }

    fn clear_sessions(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let _gate = store.write_gate.lock().await;
            let mut namespace = store.load().await?;
            namespace.sessions.clear();
            store.persist(&namespace).await
        })
    }

    fn load_pin_state(&self) -> BoxFuture<'static, StorageResult<Option<PinStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.load().await?.pin) })
    }

    fn save_pin_state(&self, pin: PinStateEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let _gate = store.write_gate.lock().await;
            let mut namespace = store.load().await?;
            namespace.pin = Some(pin);
            store.persist(&namespace).await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::dao::models::{Difficulty, LobbyStatus};

    fn lobby(code: &str) -> LobbyEntity {
        LobbyEntity {
            code: code.into(),
            name: "Quarterly refresher".into(),
            difficulty: Difficulty::Intermediate,
            moderator_name: String::new(),
            question_count: 8,
            status: LobbyStatus::Active,
            created_at: SystemTime::now(),
            started_at: None,
            closed_at: None,
            participants: Vec::new(),
            sessions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileLobbyStore::open(path.clone()).await.unwrap();
        store.save_lobby(lobby("QWERTY")).await.unwrap();

        // Re-open to prove the data survived the first handle.
        let reopened = JsonFileLobbyStore::open(path).await.unwrap();
        let found = reopened.find_lobby("QWERTY".into()).await.unwrap();
        assert_eq!(found.map(|l| l.question_count), Some(8));
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileLobbyStore::open(dir.path().join("fresh.json"))
            .await
            .unwrap();

        assert!(store.list_lobbies().await.unwrap().is_empty());
        assert!(store.list_sessions().await.unwrap().is_empty());
        assert!(store.load_pin_state().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_surfaces_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFileLobbyStore::open(path).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization { .. }));
    }
}
