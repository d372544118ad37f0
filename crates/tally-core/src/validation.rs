//! # Validation Module
//!
//! Input validation for the login form and for protected calls.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: View model (THIS MODULE)                                     │
//! │  ├── Required fields (username, password)                              │
//! │  └── Token presence before any protected request                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: REST API                                                     │
//! │  ├── Credential check                                                  │
//! │  └── Stock / permission checks                                         │
//! │                                                                         │
//! │  Nothing in layer 1 issues a request; failures here are cheap.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::validate_login_form;
//!
//! assert!(validate_login_form("alice", "secret").is_ok());
//! assert_eq!(validate_login_form("", "").unwrap_err().len(), 2);
//! ```

use crate::error::{AuthError, ClientError, ValidationError};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest username the API accepts.
pub const MAX_USERNAME_LEN: usize = 50;

// =============================================================================
// Form Validators
// =============================================================================

/// Validates that a form field is not blank.
///
/// Whitespace-only input counts as empty.
pub fn validate_required(field: &str, label: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field, label));
    }
    Ok(())
}

/// Validates a username.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
pub fn validate_username(username: &str) -> ValidationResult<()> {
    validate_required("username", "Username", username)?;

    if username.trim().chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            label: "Username".to_string(),
            max: MAX_USERNAME_LEN,
        });
    }

    Ok(())
}

/// Validates a password. Only presence is checked on the client.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    validate_required("password", "Password", password)
}

/// Validates the whole login form.
///
/// Returns every field error at once so each can be shown under its field.
pub fn validate_login_form(username: &str, password: &str) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = [validate_username(username), validate_password(password)]
        .into_iter()
        .filter_map(Result::err)
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// =============================================================================
// Token Validators
// =============================================================================

/// Returns the token if it is present and non-empty.
///
/// Protected workflows call this before building a request so that a
/// missing session never reaches the network.
pub fn require_token(token: Option<&str>) -> Result<&str, ClientError> {
    match token {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(AuthError::AuthRequired.into()),
    }
}

// =============================================================================
// Command Argument Validators
// =============================================================================

/// Parses an item id typed by the user.
pub fn parse_item_id(raw: &str) -> ValidationResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "item id".to_string(),
            reason: format!("'{}' is not a number", raw.trim()),
        })
}

/// Parses a signed quantity delta typed by the user ("+2", "-1", "3").
pub fn parse_delta(raw: &str) -> ValidationResult<i64> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    digits
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "quantity change".to_string(),
            reason: format!("'{}' is not a whole number", trimmed),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_login_form() {
        assert!(validate_login_form("alice", "secret").is_ok());

        let errors = validate_login_form("", "secret").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Username is required");

        let errors = validate_login_form("alice", "   ").unwrap_err();
        assert_eq!(errors[0].to_string(), "Password is required");

        let errors = validate_login_form("", "").unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_validate_username_length() {
        assert!(validate_username(&"a".repeat(50)).is_ok());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_require_token() {
        assert_eq!(require_token(Some("abc")).unwrap(), "abc");
        assert!(require_token(Some("")).is_err());
        assert!(require_token(Some("  ")).is_err());
        assert_eq!(
            require_token(None).unwrap_err(),
            ClientError::Auth(AuthError::AuthRequired)
        );
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_item_id(" 12 ").unwrap(), 12);
        assert!(parse_item_id("twelve").is_err());
        assert_eq!(parse_delta("+2").unwrap(), 2);
        assert_eq!(parse_delta("-3").unwrap(), -3);
        assert!(parse_delta("x").is_err());
    }
}
