/// Lobby, session log, and access-guard storage operations.
pub mod lobby_store;
/// Persisted model definitions.
pub mod models;
/// Storage abstraction error types.
pub mod storage;
