//! # Session
//!
//! The authenticated-user record and its reducer.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Anonymous ──LoginPending──► Loading ──LoginFulfilled──► Authenticated │
//! │       ▲                          │                            │    │    │
//! │       │                   LoginRejected                     Touch  │    │
//! │       │                          │                      (last_activity) │
//! │       └──────────────────────────┘                                 │    │
//! │       ▲                                                            │    │
//! │       └──────── Logout / RemoteLogoutFulfilled ────────────────────┘    │
//! │                                                                         │
//! │   RemoteLogoutRejected records the error and keeps the session.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `is_authenticated == true` always comes with a non-empty token: a login
//! response without one is handled as a rejection.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::error::{AuthError, ClientError};
use crate::types::User;

// =============================================================================
// Session
// =============================================================================

/// Current authentication state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    /// Epoch millis of the last user interaction.
    pub last_activity: Option<Timestamp>,
    pub is_loading: bool,
    pub error: Option<ClientError>,
}

/// Session transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    LoginPending,
    LoginFulfilled {
        user: User,
        access_token: String,
        at: Timestamp,
    },
    LoginRejected(ClientError),
    /// Local logout. Clears the whole record in one step.
    Logout,
    /// User activity.
    Touch { at: Timestamp },
    RemoteLogoutFulfilled,
    RemoteLogoutRejected(ClientError),
    /// Restores the persisted slice at start-up.
    Hydrate(PersistedSession),
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Applies one action.
    pub fn reduce(&mut self, action: SessionAction) {
        match action {
            SessionAction::LoginPending => {
                self.is_loading = true;
                self.error = None;
            }
            SessionAction::LoginFulfilled {
                user,
                access_token,
                at,
            } => {
                if access_token.trim().is_empty() {
                    self.clear();
                    self.error = Some(
                        AuthError::Rejected("Login response did not include a token.".into())
                            .into(),
                    );
                    return;
                }
                self.user = Some(user);
                self.token = Some(access_token);
                self.is_authenticated = true;
                self.last_activity = Some(at);
                self.is_loading = false;
                self.error = None;
            }
            SessionAction::LoginRejected(error) => {
                self.clear();
                self.error = Some(error);
            }
            SessionAction::Logout | SessionAction::RemoteLogoutFulfilled => {
                self.clear();
            }
            SessionAction::Touch { at } => {
                self.last_activity = Some(at);
            }
            SessionAction::RemoteLogoutRejected(error) => {
                self.is_loading = false;
                self.error = Some(error);
            }
            SessionAction::Hydrate(persisted) => {
                *self = Session::from(persisted);
            }
        }
    }

    /// The bearer token, if one is set and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// Staff id used on sale submissions.
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.user_id)
    }

    /// The slice written to local storage.
    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            token: self.token.clone(),
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
            last_activity: self.last_activity,
        }
    }

    fn clear(&mut self) {
        *self = Session::default();
    }
}

// =============================================================================
// Persisted Slice
// =============================================================================

/// The part of [`Session`] that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub last_activity: Option<Timestamp>,
}

impl From<PersistedSession> for Session {
    /// A slice claiming authentication without a token restores as anonymous.
    fn from(p: PersistedSession) -> Self {
        let has_token = p.token.as_deref().is_some_and(|t| !t.is_empty());
        if p.is_authenticated && !has_token {
            return Session::default();
        }
        Session {
            user: p.user,
            token: p.token,
            is_authenticated: p.is_authenticated,
            last_activity: p.last_activity,
            is_loading: false,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            user_id: 1,
            username: "alice".into(),
            email: None,
            role: Some("cashier".into()),
        }
    }

    fn logged_in(at: Timestamp) -> Session {
        let mut s = Session::new();
        s.reduce(SessionAction::LoginPending);
        s.reduce(SessionAction::LoginFulfilled {
            user: alice(),
            access_token: "tok".into(),
            at,
        });
        s
    }

    #[test]
    fn test_login_flow() {
        let mut s = Session::new();
        s.reduce(SessionAction::LoginPending);
        assert!(s.is_loading);

        let s = logged_in(42);
        assert!(s.is_authenticated);
        assert!(!s.is_loading);
        assert_eq!(s.token(), Some("tok"));
        assert_eq!(s.last_activity, Some(42));
        assert_eq!(s.user_id(), Some(1));
    }

    #[test]
    fn test_login_rejected_keeps_error() {
        let mut s = Session::new();
        s.reduce(SessionAction::LoginPending);
        let err: ClientError = AuthError::InvalidCredentials("Invalid username or password.".into()).into();
        s.reduce(SessionAction::LoginRejected(err.clone()));
        assert!(!s.is_authenticated);
        assert!(!s.is_loading);
        assert_eq!(s.error, Some(err));
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let mut s = Session::new();
        s.reduce(SessionAction::LoginFulfilled {
            user: alice(),
            access_token: String::new(),
            at: 1,
        });
        assert!(!s.is_authenticated);
        assert!(s.token().is_none());
        assert!(s.error.is_some());
    }

    #[test]
    fn test_logout_clears_everything() {
        let mut s = logged_in(10);
        s.reduce(SessionAction::Logout);
        assert_eq!(s, Session::default());
    }

    #[test]
    fn test_remote_logout_rejected_keeps_session() {
        let mut s = logged_in(10);
        s.reduce(SessionAction::RemoteLogoutRejected(ClientError::network("down")));
        assert!(s.is_authenticated);
        assert!(s.error.is_some());

        s.reduce(SessionAction::RemoteLogoutFulfilled);
        assert!(!s.is_authenticated);
    }

    #[test]
    fn test_touch_updates_activity() {
        let mut s = logged_in(10);
        s.reduce(SessionAction::Touch { at: 99 });
        assert_eq!(s.last_activity, Some(99));
    }

    #[test]
    fn test_persisted_round_trip() {
        let s = logged_in(10);
        let mut restored = Session::new();
        restored.reduce(SessionAction::Hydrate(s.to_persisted()));
        assert_eq!(restored, s);
    }

    #[test]
    fn test_hydrate_rejects_authenticated_without_token() {
        let mut s = Session::new();
        s.reduce(SessionAction::Hydrate(PersistedSession {
            token: Some(String::new()),
            user: Some(alice()),
            is_authenticated: true,
            last_activity: Some(5),
        }));
        assert!(!s.is_authenticated);
        assert!(s.user.is_none());
    }

    #[test]
    fn test_persisted_decodes_partial_json() {
        let p: PersistedSession = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(p.token.as_deref(), Some("abc"));
        assert!(!p.is_authenticated);
    }
}
