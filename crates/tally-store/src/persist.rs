//! # Persistence Boundary
//!
//! Which parts of client state survive a restart, and under which keys.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Key             Written when                 Contents                  │
//! │  ─────────────   ──────────────────────────   ───────────────────────── │
//! │  persist:auth    every session transition     PersistedSession JSON     │
//! │  persist:items   every item fetch             Vec<Item> JSON            │
//! │  cart            every cart change            Cart JSON array           │
//! │  access_token    login / logout               raw string                │
//! │  refresh_token   login / logout               raw string                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Load is tolerant: an unreadable slice is logged and replaced by its
//! default so a bad value never blocks start-up.

use tracing::{info, warn};

use tally_core::cart::{Cart, CartLine};
use tally_core::session::PersistedSession;
use tally_core::types::Item;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::kv::KvRepository;

pub const SESSION_KEY: &str = "persist:auth";
pub const ITEMS_KEY: &str = "persist:items";
pub const CART_KEY: &str = "cart";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Everything restored at start-up.
#[derive(Debug, Clone, Default)]
pub struct LoadedState {
    pub session: PersistedSession,
    pub items: Vec<Item>,
}

/// Typed access to the persisted slices.
#[derive(Debug, Clone)]
pub struct Persistence {
    kv: KvRepository,
}

impl Persistence {
    pub fn new(db: &Database) -> Self {
        Persistence { kv: db.kv() }
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Reads the session and items slices. The cart is read separately by
    /// [`Persistence::load_cart`].
    pub async fn load_on_start(&self) -> DbResult<LoadedState> {
        let session: Option<PersistedSession> =
            tolerate(SESSION_KEY, self.kv.get_json(SESSION_KEY).await)?;
        let items: Option<Vec<Item>> = tolerate(ITEMS_KEY, self.kv.get_json(ITEMS_KEY).await)?;

        info!(
            authenticated = session.as_ref().is_some_and(|s| s.is_authenticated),
            item_count = items.as_ref().map_or(0, Vec::len),
            "Restored persisted state"
        );

        Ok(LoadedState {
            session: session.unwrap_or_default(),
            items: items.unwrap_or_default(),
        })
    }

    /// Reads the cart on its own, as the sale view does when it mounts.
    pub async fn load_cart(&self) -> DbResult<Cart> {
        let lines: Option<Vec<CartLine>> = tolerate(CART_KEY, self.kv.get_json(CART_KEY).await)?;
        Ok(lines.map(Cart::from_lines).unwrap_or_default())
    }

    pub async fn access_token(&self) -> DbResult<Option<String>> {
        self.kv.get_raw(ACCESS_TOKEN_KEY).await
    }

    pub async fn refresh_token(&self) -> DbResult<Option<String>> {
        Ok(self
            .kv
            .get_raw(REFRESH_TOKEN_KEY)
            .await?
            .filter(|t| !t.is_empty()))
    }

    // =========================================================================
    // Save
    // =========================================================================

    pub async fn save_session(&self, session: &PersistedSession) -> DbResult<()> {
        self.kv.set_json(SESSION_KEY, session).await
    }

    pub async fn save_items(&self, items: &[Item]) -> DbResult<()> {
        self.kv.set_json(ITEMS_KEY, items).await
    }

    pub async fn save_cart(&self, cart: &Cart) -> DbResult<()> {
        self.kv.set_json(CART_KEY, cart).await
    }

    /// Stores the tokens issued at login. A missing refresh token removes
    /// any stale one.
    pub async fn save_tokens(&self, access: &str, refresh: Option<&str>) -> DbResult<()> {
        self.kv.set_raw(ACCESS_TOKEN_KEY, access).await?;
        match refresh {
            Some(r) => self.kv.set_raw(REFRESH_TOKEN_KEY, r).await,
            None => self.kv.remove(REFRESH_TOKEN_KEY).await.map(|_| ()),
        }
    }

    /// Removes both token keys.
    pub async fn clear_tokens(&self) -> DbResult<()> {
        self.kv.remove(ACCESS_TOKEN_KEY).await?;
        self.kv.remove(REFRESH_TOKEN_KEY).await?;
        Ok(())
    }
}

/// Maps an undecodable slice to `None`; other errors pass through.
fn tolerate<T>(key: &str, result: DbResult<Option<T>>) -> DbResult<Option<T>> {
    match result {
        Err(DbError::Serialization { message, .. }) => {
            warn!(key = %key, error = %message, "Discarding unreadable persisted value");
            Ok(None)
        }
        other => other,
    }
}
