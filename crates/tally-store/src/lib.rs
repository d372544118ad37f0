//! # tally-store: Local Storage for the Tally POS Client
//!
//! Keeps the session, the last item list, the cart and the auth tokens in a
//! SQLite file so a restart resumes where the cashier left off.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Persistence Flow                           │
//! │                                                                         │
//! │  Reducer step in apps/terminal (login, add to cart, fetch items)       │
//! │       │                                                                 │
//! │       ▼  save_on_change                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   tally-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Persistence  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ (persist.rs)  │    │  (embedded)  │  │   │
//! │  │   │ SqlitePool    │    │ KvRepository  │    │ 0001_kv.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <platform data dir>/tally.db                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_store::{Database, DbConfig, Persistence};
//!
//! let db = Database::new(DbConfig::new("tally.db")).await?;
//! let persist = Persistence::new(&db);
//! let restored = persist.load_on_start().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod persist;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use persist::{LoadedState, Persistence};
pub use pool::{Database, DbConfig};
pub use repository::kv::KvRepository;
