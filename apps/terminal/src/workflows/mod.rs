//! # Workflows
//!
//! Async operations that call the API and dispatch pending / fulfilled /
//! rejected actions to [`AppState`](crate::state::AppState).
//!
//! ```text
//!   view ──► workflow ──► dispatch(Pending)
//!                    ──► tally-api call
//!                    ──► dispatch(Fulfilled | Rejected) ──► Result to view
//! ```

pub mod auth;
pub mod inventory;
