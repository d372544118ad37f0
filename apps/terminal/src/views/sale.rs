//! # Sale View
//!
//! Item list, cart and checkout.
//!
//! ## Checkout Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handle_both_actions()                                                  │
//! │                                                                         │
//! │  cart empty? ──► alert, both steps skipped                              │
//! │  token but no user? ──► alert, both steps skipped                       │
//! │       │                                                                 │
//! │  snapshot = cart.clone()                                                │
//! │       │                                                                 │
//! │  ┌────▼──────────────┐  ok   ──► clear cart, 3 s banner                 │
//! │  │ 1. execute_sale   │  err  ──► alert "Sale execution failed: ..."     │
//! │  └────┬──────────────┘  no token ──► alert, skipped                     │
//! │       │  (runs regardless)                                              │
//! │  ┌────▼──────────────┐  ok   ──► clear cart, re-fetch items            │
//! │  │ 2. update_sales   │  err  ──► warn! only                             │
//! │  └───────────────────┘                                                  │
//! │                                                                         │
//! │  The two calls are not atomic. A mixed result is reported in the       │
//! │  CheckoutReport and logged; nothing is rolled back.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::Write as _;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, warn};

use tally_core::cart::{Cart, CartAction, CartOutcome, CartTotals};
use tally_core::error::{ClientError, CoreResult};
use tally_core::inventory::search_items;
use tally_core::money::Money;
use tally_core::types::{Item, ItemId, UserId};
use tally_core::SUCCESS_BANNER_SECS;

use crate::state::AppState;
use crate::workflows::{auth, inventory};

pub const CART_EMPTY: &str = "Your cart is empty.";
pub const TOKEN_MISSING: &str = "Authentication token is missing. Please log in.";
pub const STAFF_MISSING: &str = "No signed-in staff member. Please log in again.";
pub const OUT_OF_STOCK: &str = "Item out of stock";
pub const SALE_SUCCEEDED: &str = "Sale completed successfully!";

// =============================================================================
// Banner
// =============================================================================

/// A message that hides itself after a fixed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub expires_at: Instant,
}

impl Banner {
    pub fn new(message: impl Into<String>, ttl: Duration) -> Self {
        Banner {
            message: message.into(),
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

// =============================================================================
// Checkout Report
// =============================================================================

/// Result of one checkout step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The step was not attempted; carries the alert shown instead.
    Skipped(String),
    Succeeded,
    Failed(ClientError),
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }
}

/// Outcome of both checkout steps.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReport {
    pub sale: StepOutcome,
    pub stock: StepOutcome,
}

impl CheckoutReport {
    /// True when the sale record and the stock levels agree: both steps
    /// succeeded, or neither did.
    pub fn is_consistent(&self) -> bool {
        self.sale.succeeded() == self.stock.succeeded()
    }
}

// =============================================================================
// Sale View
// =============================================================================

/// The protected sale screen.
#[derive(Debug)]
pub struct SaleView {
    cart: Cart,
    search_term: String,
    banner: Option<Banner>,
    alert: Option<String>,
    currency: String,
}

impl SaleView {
    pub fn new(currency: impl Into<String>) -> Self {
        SaleView {
            cart: Cart::new(),
            search_term: String::new(),
            banner: None,
            alert: None,
            currency: currency.into(),
        }
    }

    /// Restores the saved cart and fetches the item list.
    pub async fn mount(&mut self, state: &AppState) -> CoreResult<usize> {
        self.cart = match state.persist().load_cart().await {
            Ok(cart) => cart,
            Err(e) => {
                error!(error = %e, "Failed to load cart");
                Cart::new()
            }
        };
        debug!(lines = self.cart.item_count(), "Cart restored");
        inventory::fetch_items(state).await
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Takes the pending alert, if any.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// The banner, while it has not expired.
    pub fn banner(&self) -> Option<&Banner> {
        let now = Instant::now();
        self.banner.as_ref().filter(|b| b.is_visible(now))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds one unit of an item from the current list.
    pub async fn add_to_cart(&mut self, state: &AppState, item_id: ItemId) -> CartOutcome {
        let item = match state.inventory().await.item(item_id).cloned() {
            Some(item) => item,
            None => {
                self.alert = Some(format!("No item with id {}", item_id));
                return CartOutcome::Unchanged;
            }
        };

        let outcome = self.apply(state, CartAction::Add(item)).await;
        if outcome == CartOutcome::OutOfStock {
            self.alert = Some(OUT_OF_STOCK.to_string());
        }
        outcome
    }

    /// Changes a line's quantity; it never drops below 1.
    pub async fn update_quantity(
        &mut self,
        state: &AppState,
        item_id: ItemId,
        delta: i64,
    ) -> CartOutcome {
        self.apply(state, CartAction::UpdateQuantity { item_id, delta })
            .await
    }

    pub async fn remove_item(&mut self, state: &AppState, item_id: ItemId) -> CartOutcome {
        self.apply(state, CartAction::Remove(item_id)).await
    }

    pub fn grand_total(&self) -> Money {
        self.cart.grand_total()
    }

    async fn apply(&mut self, state: &AppState, action: CartAction) -> CartOutcome {
        let outcome = self.cart.reduce(action);
        if outcome == CartOutcome::Changed {
            self.save_cart(state).await;
        }
        outcome
    }

    async fn save_cart(&self, state: &AppState) {
        if let Err(e) = state.persist().save_cart(&self.cart).await {
            error!(error = %e, "Failed to persist cart");
        }
    }

    async fn clear_cart(&mut self, state: &AppState) {
        if self.cart.reduce(CartAction::Clear) == CartOutcome::Changed {
            self.save_cart(state).await;
        }
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub fn search(&mut self, term: &str) {
        self.search_term = term.trim().to_string();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Items matching the search term.
    pub async fn visible_items(&self, state: &AppState) -> Vec<Item> {
        let inventory = state.inventory().await;
        search_items(&inventory.items, &self.search_term)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn refresh_inventory(&mut self, state: &AppState) -> CoreResult<usize> {
        inventory::fetch_items(state).await
    }

    /// Local logout; the terminal returns to the login view.
    pub async fn logout(&mut self, state: &AppState) {
        auth::logout(state).await;
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Submits the sale, then the stock decrement, from one cart snapshot.
    pub async fn handle_both_actions(&mut self, state: &AppState) -> CheckoutReport {
        if self.cart.is_empty() {
            self.alert = Some(CART_EMPTY.to_string());
            return CheckoutReport {
                sale: StepOutcome::Skipped(CART_EMPTY.to_string()),
                stock: StepOutcome::Skipped(CART_EMPTY.to_string()),
            };
        }

        let snapshot = self.cart.clone();
        let session = state.session().await;
        let staff = match session.user_id() {
            Some(id) => id,
            None if session.token().is_some() => {
                warn!("Checkout refused: session has a token but no user");
                self.alert = Some(STAFF_MISSING.to_string());
                return CheckoutReport {
                    sale: StepOutcome::Skipped(STAFF_MISSING.to_string()),
                    stock: StepOutcome::Skipped(STAFF_MISSING.to_string()),
                };
            }
            // No token: both requests stop at the auth check before sending.
            None => UserId::default(),
        };

        let sale = if session.token().is_none() {
            self.alert = Some(TOKEN_MISSING.to_string());
            StepOutcome::Skipped(TOKEN_MISSING.to_string())
        } else {
            match inventory::execute_sale(state, &snapshot.to_sale_request(staff)).await {
                Ok(_) => {
                    self.clear_cart(state).await;
                    self.banner = Some(Banner::new(
                        SALE_SUCCEEDED,
                        Duration::from_secs(SUCCESS_BANNER_SECS),
                    ));
                    StepOutcome::Succeeded
                }
                Err(err) => {
                    self.alert = Some(format!("Sale execution failed: {}", err.message()));
                    StepOutcome::Failed(err)
                }
            }
        };

        let stock = match inventory::update_sales(state, &snapshot.to_stock_update(staff)).await {
            Ok(_) => {
                self.clear_cart(state).await;
                if let Err(e) = inventory::fetch_items(state).await {
                    warn!(error = %e, "Failed to refresh items after stock update");
                }
                StepOutcome::Succeeded
            }
            Err(err) => {
                warn!(error = %err, "Stock update failed");
                StepOutcome::Failed(err)
            }
        };

        let report = CheckoutReport { sale, stock };
        if !report.is_consistent() {
            warn!(
                sale = ?report.sale,
                stock = ?report.stock,
                lines = snapshot.item_count(),
                "Sale and stock update disagree; records may be inconsistent"
            );
        }
        report
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    pub async fn render(&self, state: &AppState) -> String {
        let session = state.session().await;
        let inventory = state.inventory().await;
        let items = search_items(&inventory.items, &self.search_term);

        let mut out = String::new();
        let who = session
            .user
            .as_ref()
            .map(|u| u.display_name())
            .unwrap_or_default();
        let _ = writeln!(out, "== Sale == {}", who);

        if let Some(banner) = self.banner() {
            let _ = writeln!(out, "** {} **", banner.message);
        }
        if inventory.is_loading {
            let _ = writeln!(out, "Loading items...");
        }
        if let Some(err) = &inventory.error {
            let _ = writeln!(out, "Error: {}", err);
        }

        if !self.search_term.is_empty() {
            let _ = writeln!(out, "Search: \"{}\"", self.search_term);
        }
        if items.is_empty() {
            let _ = writeln!(out, "  (no items)");
        }
        for item in items {
            let _ = writeln!(
                out,
                "  [{:>4}] {:<28} {}{:>9}  qty {:>4}  {}",
                item.item_id,
                item.display_name(),
                self.currency,
                item.price.to_string(),
                item.quantity,
                item.stock_status().label()
            );
        }

        let _ = writeln!(out, "-- Cart --");
        if self.cart.is_empty() {
            let _ = writeln!(out, "  (empty)");
        }
        for line in self.cart.lines() {
            let _ = writeln!(
                out,
                "  [{:>4}] {:<28} {} x {}{} = {}{}",
                line.item_id,
                tally_core::types::title_case(&line.item_name),
                line.quantity,
                self.currency,
                line.price,
                self.currency,
                line.line_total()
            );
        }

        let totals = CartTotals::from(&self.cart);
        let _ = writeln!(
            out,
            "Items: {}  Total: {}{}",
            totals.total_quantity, self.currency, totals.grand_total
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::error::AuthError;

    #[test]
    fn test_report_consistency() {
        let both = CheckoutReport {
            sale: StepOutcome::Succeeded,
            stock: StepOutcome::Succeeded,
        };
        assert!(both.is_consistent());

        let mixed = CheckoutReport {
            sale: StepOutcome::Failed(ClientError::network("timeout")),
            stock: StepOutcome::Succeeded,
        };
        assert!(!mixed.is_consistent());

        let neither = CheckoutReport {
            sale: StepOutcome::Skipped(TOKEN_MISSING.into()),
            stock: StepOutcome::Failed(AuthError::AuthRequired.into()),
        };
        assert!(neither.is_consistent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_expires() {
        let banner = Banner::new(SALE_SUCCEEDED, Duration::from_secs(SUCCESS_BANNER_SECS));
        assert!(banner.is_visible(Instant::now()));

        tokio::time::advance(Duration::from_millis(2_999)).await;
        assert!(banner.is_visible(Instant::now()));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!banner.is_visible(Instant::now()));
    }
}
