//! # Error Types
//!
//! The tagged error taxonomy shared by every Tally crate.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── ClientError      - What a workflow reports to its view            │
//! │  │   ├── Auth         - bad credentials, missing token                  │
//! │  │   ├── Validation   - empty form fields (no request issued)           │
//! │  │   ├── Network      - request failed, nothing to interpret            │
//! │  │   └── Unknown      - server replied with an unclassified body        │
//! │  ├── AuthError                                                         │
//! │  └── ValidationError                                                   │
//! │                                                                         │
//! │  tally-store errors (separate crate)                                   │
//! │  └── DbError          - Local storage failures                         │
//! │                                                                         │
//! │  Flow: HTTP response → ClientError → view error string                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Server payloads are reduced to a message at the boundary; the raw body
//!    is kept only on `Unknown` for diagnostics
//! 3. Errors are enum variants, never free-form objects

use serde_json::Value;
use thiserror::Error;

// =============================================================================
// Client Error
// =============================================================================

/// Errors surfaced by client workflows.
///
/// Every variant renders a message suitable for the error line of a view.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Authentication failed or is required.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Form input was rejected before any request was issued.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request could not be completed (connection refused, timeout,
    /// undecodable response).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    ///
    /// `message` is the `error`/`detail` field of the body when present,
    /// otherwise the fallback message of the workflow that failed.
    #[error("{message}")]
    Unknown {
        status: u16,
        message: String,
        body: Option<Value>,
    },
}

impl ClientError {
    /// Builds a `Network` error.
    pub fn network(message: impl Into<String>) -> Self {
        ClientError::Network(message.into())
    }

    /// Returns true for authentication failures (including a missing token).
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }

    /// The message shown to the user.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

// =============================================================================
// Auth Error
// =============================================================================

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The login endpoint rejected the credentials.
    ///
    /// Carries the server's `error` message, e.g.
    /// "Invalid username or password.".
    #[error("{0}")]
    InvalidCredentials(String),

    /// A protected call was attempted without a session token.
    #[error("User not authenticated.")]
    AuthRequired,

    /// Remote logout was attempted without a stored refresh token.
    #[error("No refresh token found.")]
    MissingRefreshToken,

    /// The server refused the bearer token (401/403).
    #[error("{0}")]
    Rejected(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when form input doesn't meet requirements and are raised
/// before any request goes out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    ///
    /// `label` is the human-readable field name ("Username").
    #[error("{label} is required")]
    Required { field: String, label: String },

    /// Field value is too long.
    #[error("{label} must be at most {max} characters")]
    TooLong {
        field: String,
        label: String,
        max: usize,
    },

    /// Invalid format (e.g. a non-numeric item id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a `Required` error.
    pub fn required(field: impl Into<String>, label: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
            label: label.into(),
        }
    }

    /// Name of the form field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ClientError.
pub type CoreResult<T> = Result<T, ClientError>;

// =============================================================================
// Unit Tests
// =============================================================================
