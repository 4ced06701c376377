//! PIN access guard for the protected analytics view.
//!
//! The PIN is stored as a salted, encoded digest rather than cleartext, and
//! repeated failures trip a timed lockout. This gates a classroom dashboard,
//! not a security boundary; the encoding is deliberately lightweight.

use std::time::{Duration, SystemTime};

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    dao::models::PinStateEntity,
    dto::validation::validate_pin,
    error::ServiceError,
    state::SharedState,
};

const PIN_SALT: &str = "cybersecurity_training_salt_2024";

/// Rejections produced by the access guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinError {
    /// No PIN has been configured yet.
    #[error("No PIN set")]
    NotSet,
    /// A lockout from earlier failures is still active.
    #[error("Too many failed attempts. Try again in {minutes_left} minute(s).")]
    Locked {
        /// Whole minutes until the lockout lifts, rounded up.
        minutes_left: u64,
    },
    /// This failure exhausted the attempt budget and started a lockout.
    #[error("Too many attempts. Locked out for {lockout_minutes} minutes.")]
    TooManyAttempts {
        /// Length of the lockout that was just started, in minutes.
        lockout_minutes: u64,
    },
    /// Wrong PIN, with attempts still left before lockout.
    #[error("Incorrect PIN. {attempts_left} attempts remaining.")]
    Incorrect {
        /// Attempts left before the lockout trips.
        attempts_left: u32,
    },
}

/// Set (or overwrite) the dashboard PIN, clearing any prior failure state.
pub async fn set_pin(state: &SharedState, pin: &str) -> Result<(), ServiceError> {
    validate_pin(pin).map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    state
        .store()
        .save_pin_state(PinStateEntity {
            pin_hash: Some(encode_pin(pin)),
            attempt_count: 0,
            lockout_until: None,
        })
        .await?;

    info!("dashboard PIN updated");
    Ok(())
}

/// Verify a PIN attempt.
///
/// A correct attempt resets the failure counter. An incorrect attempt
/// increments it, and the attempt that exhausts the budget starts the
/// lockout window. Attempts during an active lockout are rejected without
/// touching the counter, regardless of whether the PIN is correct.
pub async fn verify_pin(state: &SharedState, pin: &str) -> Result<(), ServiceError> {
    let store = state.store();
    let mut pin_state = store.load_pin_state().await?.unwrap_or_default();

    let Some(expected) = pin_state.pin_hash.clone() else {
        return Err(PinError::NotSet.into());
    };

    let now = SystemTime::now();
    if let Some(until) = pin_state.lockout_until {
        if let Ok(left) = until.duration_since(now) {
            return Err(PinError::Locked {
                minutes_left: minutes_ceil(left),
            }
            .into());
        }
        // Lockout has lapsed; the attempt budget starts fresh.
        pin_state.lockout_until = None;
        pin_state.attempt_count = 0;
    }

    if encode_pin(pin) == expected {
        pin_state.attempt_count = 0;
        pin_state.lockout_until = None;
        store.save_pin_state(pin_state).await?;
        return Ok(());
    }

    pin_state.attempt_count += 1;
    let max_attempts = state.config().pin_max_attempts;

    let refusal = if pin_state.attempt_count >= max_attempts {
        let lockout = state.config().pin_lockout;
        pin_state.lockout_until = Some(now + lockout);
        warn!(
            attempts = pin_state.attempt_count,
            "PIN attempt budget exhausted, lockout started"
        );
        PinError::TooManyAttempts {
            lockout_minutes: minutes_ceil(lockout),
        }
    } else {
        PinError::Incorrect {
            attempts_left: max_attempts - pin_state.attempt_count,
        }
    };

    store.save_pin_state(pin_state).await?;
    Err(refusal.into())
}

/// Change the PIN after verifying the current one.
pub async fn change_pin(
    state: &SharedState,
    current_pin: &str,
    new_pin: &str,
) -> Result<(), ServiceError> {
    verify_pin(state, current_pin).await?;
    set_pin(state, new_pin).await
}

/// Whether a PIN has been configured.
pub async fn is_pin_set(state: &SharedState) -> Result<bool, ServiceError> {
    let pin_state = state.store().load_pin_state().await?.unwrap_or_default();
    Ok(pin_state.pin_hash.is_some())
}

/// Active-lockout message, if one is in effect. A lapsed lockout is cleared
/// and persisted as a side effect.
pub async fn check_lockout(state: &SharedState) -> Result<Option<String>, ServiceError> {
    let store = state.store();
    let mut pin_state = store.load_pin_state().await?.unwrap_or_default();

    let Some(until) = pin_state.lockout_until else {
        return Ok(None);
    };

    match until.duration_since(SystemTime::now()) {
        Ok(left) => Ok(Some(
            PinError::Locked {
                minutes_left: minutes_ceil(left),
            }
            .to_string(),
        )),
        Err(_) => {
            pin_state.lockout_until = None;
            pin_state.attempt_count = 0;
            store.save_pin_state(pin_state).await?;
            Ok(None)
        }
    }
}

/// Attempts left before the lockout trips.
pub async fn remaining_attempts(state: &SharedState) -> Result<u32, ServiceError> {
    let pin_state = state.store().load_pin_state().await?.unwrap_or_default();
    Ok(state
        .config()
        .pin_max_attempts
        .saturating_sub(pin_state.attempt_count))
}

fn encode_pin(pin: &str) -> String {
    STANDARD.encode(format!("{pin}{PIN_SALT}"))
}

fn minutes_ceil(duration: Duration) -> u64 {
    duration.as_secs().div_ceil(60).max(1)
}
