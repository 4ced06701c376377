/// Pure grouping and statistics over session records.
pub mod aggregation;
/// Read-only analytics facades over the session logs.
pub mod analytics_service;
/// CSV and JSON export views over lobbies and analytics.
pub mod export_service;
/// Lobby creation, membership, and the expiry sweep.
pub mod lobby_service;
/// PIN access guard for the protected analytics view.
pub mod pin_service;
/// Recording of completed training attempts.
pub mod session_service;
/// Polling-based change observation for lobby snapshots.
pub mod watch_service;
