//! # Response Interpretation
//!
//! Turns a failed HTTP exchange into a [`ClientError`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Outcome                              ClientError                       │
//! │  ───────────────────────────────────  ───────────────────────────────── │
//! │  connect / timeout / bad body         Network(reason)                   │
//! │  login 400 / 401                      Auth(InvalidCredentials(msg))     │
//! │  any other call 401 / 403             Auth(Rejected(msg))               │
//! │  other non-2xx                        Unknown { status, msg, body }     │
//! │                                                                         │
//! │  msg = body.error | body.detail | body.non_field_errors[0]              │
//! │        | body when it is a JSON string | per-call fallback              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::Value;
use tally_core::error::{AuthError, ClientError};

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ClientError>;

/// Which endpoint failed; decides the fallback message and how 400/401 are
/// classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Logout,
    Items,
    Sales,
    UpdateSales,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Login => "v1/login/",
            Endpoint::Logout => "v1/logout/",
            Endpoint::Items => "v1/items/",
            Endpoint::Sales => "v1/sales/",
            Endpoint::UpdateSales => "v1/update-sales/",
        }
    }

    /// Message used when the server gives no usable one.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Endpoint::Login => "Login failed. Please check your credentials.",
            Endpoint::Logout => "Logout failed.",
            Endpoint::Items => "Failed to fetch items.",
            Endpoint::Sales => "Failed to execute sale.",
            Endpoint::UpdateSales => "Failed to update sales.",
        }
    }
}

/// Pulls a human-readable message out of an error body.
pub fn extract_message(body: &Value) -> Option<String> {
    if let Some(s) = body.as_str() {
        return non_empty(s);
    }

    for field in ["error", "detail", "message"] {
        if let Some(s) = body.get(field).and_then(Value::as_str) {
            if let Some(msg) = non_empty(s) {
                return Some(msg);
            }
        }
    }

    body.get("non_field_errors")
        .and_then(Value::as_array)
        .and_then(|errs| errs.first())
        .and_then(Value::as_str)
        .and_then(non_empty)
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Classifies a non-success response.
///
/// `body` is the raw response text. Non-JSON text is kept on `Unknown` as a
/// JSON string but never shown as the message.
pub fn classify(endpoint: Endpoint, status: u16, body: &str) -> ClientError {
    let (parsed, message) = if body.trim().is_empty() {
        (None, None)
    } else {
        match serde_json::from_str::<Value>(body) {
            Ok(json) => {
                let message = extract_message(&json);
                (Some(json), message)
            }
            Err(_) => (Some(Value::String(body.to_string())), None),
        }
    };
    let message = message.unwrap_or_else(|| endpoint.fallback_message().to_string());

    match (endpoint, status) {
        (Endpoint::Login, 400 | 401) => AuthError::InvalidCredentials(message).into(),
        (_, 401 | 403) => AuthError::Rejected(message).into(),
        _ => ClientError::Unknown {
            status,
            message,
            body: parsed,
        },
    }
}

/// Maps a transport-level failure.
pub fn transport(endpoint: Endpoint, err: &reqwest::Error) -> ClientError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "could not reach the server".to_string()
    } else if err.is_decode() {
        "unexpected response from the server".to_string()
    } else {
        err.to_string()
    };
    tracing::debug!(endpoint = endpoint.path(), error = %err, "Transport failure");
    ClientError::Network(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_message_fields() {
        assert_eq!(extract_message(&json!({"error": "Bad"})).as_deref(), Some("Bad"));
        assert_eq!(extract_message(&json!({"detail": "Nope"})).as_deref(), Some("Nope"));
        assert_eq!(
            extract_message(&json!({"non_field_errors": ["First", "Second"]})).as_deref(),
            Some("First")
        );
        assert_eq!(extract_message(&json!("plain")).as_deref(), Some("plain"));
        assert_eq!(extract_message(&json!({"error": ""})), None);
        assert_eq!(extract_message(&json!({"sale_items": ["required"]})), None);
    }

    #[test]
    fn test_login_rejection_is_invalid_credentials() {
        let err = classify(Endpoint::Login, 401, r#"{"error":"Invalid username or password."}"#);
        assert_eq!(
            err,
            ClientError::Auth(AuthError::InvalidCredentials(
                "Invalid username or password.".into()
            ))
        );

        let err = classify(Endpoint::Login, 400, "");
        assert_eq!(err.to_string(), "Login failed. Please check your credentials.");
    }

    #[test]
    fn test_forbidden_is_auth_rejected() {
        let err = classify(Endpoint::Items, 403, r#"{"detail":"Token expired"}"#);
        assert_eq!(err, ClientError::Auth(AuthError::Rejected("Token expired".into())));
    }

    #[test]
    fn test_other_status_is_unknown_with_body() {
        let err = classify(Endpoint::Sales, 400, r#"{"error":"Not enough stock for cola"}"#);
        match err {
            ClientError::Unknown { status, message, body } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Not enough stock for cola");
                assert_eq!(body.unwrap()["error"], "Not enough stock for cola");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fallback_per_endpoint() {
        assert_eq!(classify(Endpoint::Sales, 500, "").to_string(), "Failed to execute sale.");
        assert_eq!(
            classify(Endpoint::UpdateSales, 500, "{}").to_string(),
            "Failed to update sales."
        );
        assert_eq!(classify(Endpoint::Items, 502, "").to_string(), "Failed to fetch items.");
        assert_eq!(classify(Endpoint::Logout, 400, "{}").to_string(), "Logout failed.");
    }

    #[test]
    fn test_html_body_uses_fallback() {
        let err = classify(Endpoint::Items, 502, "<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), "Failed to fetch items.");
        assert!(matches!(err, ClientError::Unknown { body: Some(Value::String(_)), .. }));
    }
}
