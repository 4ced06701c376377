//! Service-level error taxonomy and conversions from lower layers.

use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    services::pin_service::PinError,
    state::{InvalidTransition, JoinRefusal},
};

/// Errors surfaced by service layer operations.
///
/// Every operation returns an explicit `Result`; callers branch immediately.
/// There is no retry policy: a failed operation is surfaced once and may be
/// re-issued by the caller.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed to read or write.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Requested lobby or record was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current lobby state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Access-guard rejection on the protected analytics view.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {err}"))
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<JoinRefusal> for ServiceError {
    fn from(err: JoinRefusal) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<PinError> for ServiceError {
    fn from(err: PinError) -> Self {
        ServiceError::Unauthorized(err.to_string())
    }
}
