//! Route guard for the sale view.

use crate::session::Session;

/// What to show instead of (or as) the protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// A login is in flight; show a placeholder.
    Loading,
    /// No usable session; go back to the login view.
    RedirectToLogin,
    Allow,
}

/// Decides access to a protected view. Evaluated on every render.
pub fn guard(session: &Session) -> GuardOutcome {
    if session.is_loading {
        GuardOutcome::Loading
    } else if !session.is_authenticated || session.token().is_none() {
        GuardOutcome::RedirectToLogin
    } else {
        GuardOutcome::Allow
    }
}
