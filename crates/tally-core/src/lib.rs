//! # tally-core: Pure Client Logic for Tally POS
//!
//! Domain types, money, the error taxonomy and every state transition of the
//! client, written as pure functions over plain data.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Client                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/terminal (tally-terminal)                 │   │
//! │  │    Login view ──► Route guard ──► Sale view ──► Checkout        │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │ workflows                    │ persistence           │
//! │  ┌──────────────▼──────────────┐  ┌────────────▼──────────────────┐   │
//! │  │  tally-api (reqwest)        │  │  tally-store (sqlx SQLite)    │   │
//! │  │  /v1/login/ /v1/items/ ...  │  │  kv_store: persist:auth, cart │   │
//! │  └──────────────┬──────────────┘  └────────────┬──────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────────────────▼──────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   types  money  error  validation                               │   │
//! │  │   cart   session  inventory  guard  inactivity  clock           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • REDUCERS OVER ACTIONS     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - API types (User, Item, sale payloads)
//! - [`money`] - Integer-cent money
//! - [`error`] - `ClientError` and friends
//! - [`validation`] - Login form and token checks
//! - [`cart`] - Cart reducer and totals
//! - [`session`] - Session reducer and its persisted slice
//! - [`inventory`] - Item list and last sale responses
//! - [`guard`] - Route guard decision
//! - [`inactivity`] - Auto-logout policy
//! - [`clock`] - Time source used by the policy and the workflows
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::cart::Cart;
//! use tally_core::money::Money;
//! use tally_core::types::Item;
//!
//! let cola = Item {
//!     item_id: 1,
//!     item_name: "cola".into(),
//!     quantity: 12,
//!     price: Money::from_cents(150),
//!     is_active: None,
//!     created_at: None,
//!     updated_at: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add(&cola);
//! cart.add(&cola);
//! assert_eq!(cart.grand_total().to_string(), "3.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod clock;
pub mod error;
pub mod guard;
pub mod inactivity;
pub mod inventory;
pub mod money;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartAction, CartLine, CartOutcome};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use error::{AuthError, ClientError, CoreResult, ValidationError};
pub use guard::{guard, GuardOutcome};
pub use inactivity::InactivityPolicy;
pub use inventory::{InventoryAction, InventoryState};
pub use money::{Money, TaxRate};
pub use session::{PersistedSession, Session, SessionAction};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Inactivity window before an automatic logout: 60 minutes.
pub const INACTIVITY_LIMIT_MS: i64 = 3_600_000;

/// How often the auto-logout monitor checks the session, in seconds.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// How long the "sale completed" banner stays visible, in seconds.
pub const SUCCESS_BANNER_SECS: u64 = 3;

/// Items with fewer units than this are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Upper bound on one cart line's quantity.
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Tax applied on the sale screen. Always zero.
pub const SALE_TAX_RATE: TaxRate = TaxRate::from_bps(0);
