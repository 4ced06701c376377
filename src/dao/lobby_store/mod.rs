/// Durable single-file JSON backend.
pub mod json_file;
/// In-process backend used as the default store and in tests.
pub mod memory;

use crate::dao::models::{LobbyEntity, PinStateEntity, SessionRecordEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for lobbies, the standalone
/// session log, and the access-guard scalars.
///
/// Mutations follow a read-the-object, mutate, write-it-back discipline at
/// the call sites; backends only persist what they are handed. Last write
/// wins on concurrent writers, which is accepted at classroom scale.
pub trait LobbyStore: Send + Sync {
    fn save_lobby(&self, lobby: LobbyEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_lobby(&self, code: String) -> BoxFuture<'static, StorageResult<Option<LobbyEntity>>>;
    fn list_lobbies(&self) -> BoxFuture<'static, StorageResult<Vec<LobbyEntity>>>;
    fn append_session(&self, record: SessionRecordEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn list_sessions(&self) -> BoxFuture<'static, StorageResult<Vec<SessionRecordEntity>>>;
    fn clear_sessions(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn load_pin_state(&self) -> BoxFuture<'static, StorageResult<Option<PinStateEntity>>>;
    fn save_pin_state(&self, pin: PinStateEntity) -> BoxFuture<'static, StorageResult<()>>;
}
