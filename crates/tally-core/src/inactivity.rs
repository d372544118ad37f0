//! # Inactivity Policy
//!
//! Decides when an authenticated session has been idle too long.
//!
//! ```text
//!   last_activity                         now
//!        │◄──────────── elapsed ────────────►│
//!        │                                   │
//!        elapsed >  limit  → logout
//!        elapsed <= limit  → keep session
//! ```
//!
//! The monitor in the terminal app runs this check on every tick; the check
//! itself holds no state.

use std::time::Duration;

use crate::clock::Timestamp;
use crate::session::Session;
use crate::INACTIVITY_LIMIT_MS;

/// Auto-logout limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactivityPolicy {
    limit_ms: i64,
}

impl Default for InactivityPolicy {
    fn default() -> Self {
        InactivityPolicy {
            limit_ms: INACTIVITY_LIMIT_MS,
        }
    }
}

impl InactivityPolicy {
    /// Policy with a custom limit. Sub-millisecond precision is dropped.
    pub fn new(limit: Duration) -> Self {
        InactivityPolicy {
            limit_ms: i64::try_from(limit.as_millis()).unwrap_or(i64::MAX),
        }
    }

    pub fn limit_ms(&self) -> i64 {
        self.limit_ms
    }

    /// True when `now - last_activity` is strictly greater than the limit.
    ///
    /// A missing timestamp counts as expired.
    pub fn is_expired(&self, last_activity: Option<Timestamp>, now: Timestamp) -> bool {
        match last_activity {
            Some(at) => now.saturating_sub(at) > self.limit_ms,
            None => true,
        }
    }

    /// True when `session` is authenticated and idle past the limit.
    pub fn should_logout(&self, session: &Session, now: Timestamp) -> bool {
        session.is_authenticated && self.is_expired(session.last_activity, now)
    }
}
