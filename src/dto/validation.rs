//! Validation helpers for request payloads.

use validator::ValidationError;

/// Longest username accepted in a lobby roster.
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Validates a participant username: 1 to 20 visible characters drawn from
/// letters, digits, spaces, `_`, `-` and `.`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        let mut err = ValidationError::new("username_empty");
        err.message = Some("Username must not be empty".into());
        return Err(err);
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        let mut err = ValidationError::new("username_length");
        err.message =
            Some(format!("Username must be at most {MAX_USERNAME_LENGTH} characters").into());
        return Err(err);
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.'))
    {
        let mut err = ValidationError::new("username_charset");
        err.message = Some(
            "Username may only contain letters, digits, spaces, '_', '-' and '.'".into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a PIN is exactly 4 ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("pin_format");
        err.message = Some("PIN must be exactly 4 digits".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("Bob Smith").is_ok());
        assert!(validate_username("j.doe_3-a").is_ok());
        assert!(validate_username(&"a".repeat(20)).is_ok());
    }

    #[test]
    fn test_validate_username_invalid() {
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err()); // whitespace only
        assert!(validate_username(&"a".repeat(21)).is_err()); // too long
        assert!(validate_username("alice!").is_err()); // punctuation
        assert!(validate_username("bob,carol").is_err()); // breaks CSV export
    }

    #[test]
    fn test_validate_pin() {
        assert!(validate_pin("0000").is_ok());
        assert!(validate_pin("4821").is_ok());
        assert!(validate_pin("123").is_err()); // too short
        assert!(validate_pin("12345").is_err()); // too long
        assert!(validate_pin("12a4").is_err()); // non-digit
        assert!(validate_pin("１２３４").is_err()); // non-ASCII digits
    }
}
