//! # tally-api: REST Client for the Tally POS Backend
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  workflow (apps/terminal)                                              │
//! │       │  client.execute_sale(&sale, session.token())                   │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  tally-api (THIS CRATE)                         │   │
//! │  │   require_token ──► reqwest ──► status check ──► serde_json     │   │
//! │  │                                       │                         │   │
//! │  │                                       ▼ non-2xx                 │   │
//! │  │                               error::classify → ClientError     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  POS REST API  /v1/login/  /v1/logout/  /v1/items/  /v1/sales/  ...    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiConfig, DEFAULT_TIMEOUT};
pub use error::{ApiResult, Endpoint};
