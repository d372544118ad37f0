//! # Cart
//!
//! The sale screen's cart, expressed as a reducer over [`CartAction`].
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  User Action          CartAction                 Cart Change            │
//! │  ───────────          ──────────                 ───────────            │
//! │                                                                         │
//! │  Add to Cart ───────► Add(item) ───────────────► qty + 1 or push(qty=1)│
//! │                       (item.quantity ≤ 0 → OutOfStock, unchanged)      │
//! │                                                                         │
//! │  +/- buttons ───────► UpdateQuantity(id, Δ) ───► qty = clamp(qty + Δ)  │
//! │                                                                         │
//! │  Remove ────────────► Remove(id) ──────────────► retain(id != id)      │
//! │                                                                         │
//! │  Sale succeeded ────► Clear ───────────────────► lines.clear()         │
//! │                                                                         │
//! │  View mounted ──────► Hydrate(lines) ──────────► lines = persisted     │
//! │                                                                         │
//! │  Quantities stay within 1..=MAX_LINE_QUANTITY.                          │
//! │  NOTE: the caller persists the cart after every Changed outcome.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::MAX_LINE_QUANTITY;
use crate::types::{Item, ItemId, SaleLine, SaleRequest, StockUpdateLine, StockUpdateRequest, UserId};

/// An item in the cart.
///
/// Carries a snapshot of the item fields at the time it was added; the
/// `quantity` here is the quantity in the cart, not the stock level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: ItemId,

    pub item_name: String,

    /// Unit price when the item was added.
    pub price: Money,

    /// Quantity in cart. Always within `1..=MAX_LINE_QUANTITY`.
    pub quantity: i64,
}

impl CartLine {
    /// Creates a line with quantity 1 from an inventory item.
    pub fn from_item(item: &Item) -> Self {
        CartLine {
            item_id: item.item_id,
            item_name: item.item_name.clone(),
            price: item.price,
            quantity: 1,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// Cart transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    Add(Item),
    UpdateQuantity { item_id: ItemId, delta: i64 },
    Remove(ItemId),
    Clear,
    Hydrate(Vec<CartLine>),
}

/// What a reducer step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    /// The cart changed and should be persisted.
    Changed,

    /// The action was a no-op (unknown id, empty cart cleared, line at
    /// its quantity cap).
    Unchanged,

    /// `Add` was refused because the item has no stock.
    OutOfStock,
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `item_id` (adding the same item increments)
/// - Every line has `1 ≤ quantity ≤ MAX_LINE_QUANTITY`
/// - Line order is insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Builds a cart from persisted lines, dropping any line that violates
    /// the invariants (duplicate ids keep the first, quantity < 1 dropped).
    /// Oversized quantities are capped.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Cart::new();
        for mut line in lines {
            if line.quantity >= 1 && cart.line(line.item_id).is_none() {
                line.quantity = line.quantity.min(MAX_LINE_QUANTITY);
                cart.lines.push(line);
            }
        }
        cart
    }

    /// Applies one action.
    pub fn reduce(&mut self, action: CartAction) -> CartOutcome {
        match action {
            CartAction::Add(item) => self.add(&item),
            CartAction::UpdateQuantity { item_id, delta } => self.update_quantity(item_id, delta),
            CartAction::Remove(item_id) => self.remove(item_id),
            CartAction::Clear => {
                if self.lines.is_empty() {
                    CartOutcome::Unchanged
                } else {
                    self.lines.clear();
                    CartOutcome::Changed
                }
            }
            CartAction::Hydrate(lines) => {
                *self = Cart::from_lines(lines);
                CartOutcome::Changed
            }
        }
    }

    /// Adds one unit of `item`.
    ///
    /// Refused when the item's stock is zero or negative. A line already at
    /// [`MAX_LINE_QUANTITY`] is left as is.
    pub fn add(&mut self, item: &Item) -> CartOutcome {
        if !item.in_stock() {
            return CartOutcome::OutOfStock;
        }

        match self.lines.iter_mut().find(|l| l.item_id == item.item_id) {
            Some(line) if line.quantity >= MAX_LINE_QUANTITY => return CartOutcome::Unchanged,
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine::from_item(item)),
        }
        CartOutcome::Changed
    }

    /// Adjusts a line's quantity by `delta`, kept within
    /// `1..=MAX_LINE_QUANTITY`.
    pub fn update_quantity(&mut self, item_id: ItemId, delta: i64) -> CartOutcome {
        match self.lines.iter_mut().find(|l| l.item_id == item_id) {
            Some(line) => {
                let next = line.quantity.saturating_add(delta).clamp(1, MAX_LINE_QUANTITY);
                if next == line.quantity {
                    CartOutcome::Unchanged
                } else {
                    line.quantity = next;
                    CartOutcome::Changed
                }
            }
            None => CartOutcome::Unchanged,
        }
    }

    /// Removes a line.
    pub fn remove(&mut self, item_id: ItemId) -> CartOutcome {
        let before = self.lines.len();
        self.lines.retain(|l| l.item_id != item_id);
        if self.lines.len() == before {
            CartOutcome::Unchanged
        } else {
            CartOutcome::Changed
        }
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up a line by item id.
    pub fn line(&self, item_id: ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_id == item_id)
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |acc, l| acc.saturating_add(l.quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Σ quantity × price.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Tax at the sale screen's fixed rate (0%).
    pub fn tax(&self) -> Money {
        self.subtotal().calculate_tax(crate::SALE_TAX_RATE)
    }

    /// Grand total: subtotal plus tax. With the 0% rate this equals the
    /// subtotal; an empty cart totals 0.00.
    pub fn grand_total(&self) -> Money {
        self.subtotal() + self.tax()
    }

    /// Builds the `POST /v1/sales/` body from the current lines.
    pub fn to_sale_request(&self, staff: UserId) -> SaleRequest {
        SaleRequest {
            staff,
            sale_items: self
                .lines
                .iter()
                .map(|l| SaleLine {
                    item: l.item_id,
                    quantity: l.quantity,
                    price: l.price,
                })
                .collect(),
        }
    }

    /// Builds the `POST /v1/update-sales/` body from the current lines.
    pub fn to_stock_update(&self, staff: UserId) -> StockUpdateRequest {
        StockUpdateRequest {
            staff,
            sale_items: self
                .lines
                .iter()
                .map(|l| StockUpdateLine {
                    item: l.item_id,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

/// Cart totals summary for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub grand_total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            tax: cart.tax(),
            grand_total: cart.grand_total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: ItemId, price_cents: i64, stock: i64) -> Item {
        Item {
            item_id: id,
            item_name: format!("item {}", id),
            quantity: stock,
            price: Money::from_cents(price_cents),
            is_active: Some(true),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_add_appends_then_increments() {
        let mut cart = Cart::new();
        let cola = item(1, 150, 10);

        assert_eq!(cart.add(&cola), CartOutcome::Changed);
        assert_eq!(cart.line(1).unwrap().quantity, 1);

        cart.add(&cola);
        cart.add(&cola);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.line(1).unwrap().quantity, 3);
    }

    #[test]
    fn test_repeated_adds_sum() {
        // q1 adds then q2 adds of the same item yield q1 + q2
        for (q1, q2) in [(0, 0), (1, 0), (2, 3), (5, 7)] {
            let mut cart = Cart::new();
            let it = item(9, 100, 100);
            for _ in 0..(q1 + q2) {
                cart.reduce(CartAction::Add(it.clone()));
            }
            let qty = cart.line(9).map(|l| l.quantity).unwrap_or(0);
            assert_eq!(qty, q1 + q2);
        }
    }

    #[test]
    fn test_add_out_of_stock_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add(&item(1, 100, 3));
        let before = cart.clone();

        assert_eq!(cart.add(&item(2, 100, 0)), CartOutcome::OutOfStock);
        assert_eq!(cart, before);

        // Stock is checked even when the line already exists
        assert_eq!(cart.add(&item(1, 100, 0)), CartOutcome::OutOfStock);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_quantity_never_below_one() {
        let mut cart = Cart::new();
        cart.add(&item(1, 100, 10));
        cart.add(&item(1, 100, 10));

        for delta in [-1, -2, -100, i64::MIN, 0] {
            let mut c = cart.clone();
            c.update_quantity(1, delta);
            assert!(c.line(1).unwrap().quantity >= 1, "delta {}", delta);
        }

        cart.update_quantity(1, -5);
        assert_eq!(cart.line(1).unwrap().quantity, 1);
        cart.update_quantity(1, 4);
        assert_eq!(cart.line(1).unwrap().quantity, 5);
    }

    #[test]
    fn test_quantity_is_capped() {
        let mut cart = Cart::new();
        let cola = item(1, 150, 10);
        cart.add(&cola);

        assert_eq!(cart.update_quantity(1, i64::MAX), CartOutcome::Changed);
        assert_eq!(cart.line(1).unwrap().quantity, MAX_LINE_QUANTITY);
        assert_eq!(cart.grand_total().cents(), 150 * MAX_LINE_QUANTITY);

        assert_eq!(cart.add(&cola), CartOutcome::Unchanged);
        assert_eq!(cart.update_quantity(1, 1), CartOutcome::Unchanged);
        assert_eq!(cart.line(1).unwrap().quantity, MAX_LINE_QUANTITY);

        let restored = Cart::from_lines(vec![CartLine {
            quantity: i64::MAX,
            ..CartLine::from_item(&item(2, i64::MAX, 1))
        }]);
        assert_eq!(restored.line(2).unwrap().quantity, MAX_LINE_QUANTITY);
        assert_eq!(restored.grand_total().cents(), i64::MAX);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut cart = Cart::new();
        assert_eq!(cart.update_quantity(42, 1), CartOutcome::Unchanged);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(&item(1, 100, 10));
        cart.add(&item(2, 100, 10));

        assert_eq!(cart.remove(1), CartOutcome::Changed);
        assert_eq!(cart.remove(1), CartOutcome::Unchanged);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_grand_total_scenario() {
        let mut cart = Cart::new();
        cart.reduce(CartAction::Hydrate(vec![
            CartLine {
                item_id: 1,
                item_name: "a".into(),
                price: Money::from_cents(1000),
                quantity: 2,
            },
            CartLine {
                item_id: 2,
                item_name: "b".into(),
                price: Money::from_cents(500),
                quantity: 1,
            },
        ]));

        assert_eq!(cart.grand_total().to_string(), "25.00");
        assert!(cart.tax().is_zero());
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        let cart = Cart::new();
        assert_eq!(cart.grand_total().to_string(), "0.00");
        assert_eq!(CartTotals::from(&cart).item_count, 0);
    }

    #[test]
    fn test_hydrate_drops_invalid_lines() {
        let line = |id, qty| CartLine {
            item_id: id,
            item_name: "x".into(),
            price: Money::from_cents(100),
            quantity: qty,
        };
        let cart = Cart::from_lines(vec![line(1, 2), line(1, 5), line(2, 0)]);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.line(1).unwrap().quantity, 2);
    }

    #[test]
    fn test_request_builders_share_snapshot() {
        let mut cart = Cart::new();
        cart.add(&item(1, 1000, 5));
        cart.add(&item(2, 250, 5));
        cart.update_quantity(2, 2);

        let sale = cart.to_sale_request(7);
        let stock = cart.to_stock_update(7);
        assert_eq!(sale.staff, 7);
        assert_eq!(sale.sale_items.len(), 2);
        assert_eq!(sale.sale_items[1].quantity, 3);
        assert_eq!(sale.sale_items[1].price.cents(), 250);
        assert_eq!(stock.sale_items[1], StockUpdateLine { item: 2, quantity: 3 });
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut cart = Cart::new();
        cart.add(&item(1, 100, 5));
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
