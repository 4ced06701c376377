//! Request payloads and read-only projections exchanged with the embedding UI.

use std::time::SystemTime;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Analytics result shapes produced by the query facade.
pub mod analytics;
/// Lobby and session request/response payloads.
pub mod lobby;
/// Validation helpers for request payloads.
pub mod validation;

pub(crate) fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
