//! # Domain Types
//!
//! Types exchanged with the POS REST API and shown by the views.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │      User       │   │      Item       │   │    SaleRequest      │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  user_id        │   │  item_id        │   │  staff (user_id)    │   │
//! │  │  username       │   │  item_name      │   │  sale_items[]       │   │
//! │  │  role           │   │  quantity       │   │   item/qty/price    │   │
//! │  └─────────────────┘   │  price (Money)  │   └─────────────────────┘   │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │  LoginRequest   │   │  LoginResponse  │   │ StockUpdateRequest  │   │
//! │  │  username       │   │  user           │   │  staff              │   │
//! │  │  password       │   │  access_token   │   │  sale_items[]       │   │
//! │  └─────────────────┘   │  refresh_token  │   │   item/qty          │   │
//! │                        └─────────────────┘   └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names follow the API's snake_case JSON exactly.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

/// Identifier of an inventory item (`item_id` on the API).
pub type ItemId = i64;

/// Identifier of a staff user (`user_id` on the API).
pub type UserId = i64;

// =============================================================================
// User
// =============================================================================

/// The authenticated staff member, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,

    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Superuser, Manager, Waiter, Cashier or Supervisor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl User {
    /// "alice smith (Cashier)" → "Alice Smith (Cashier)" for the header line.
    pub fn display_name(&self) -> String {
        match self.role.as_deref() {
            Some(role) if !role.is_empty() => {
                format!("{} ({})", title_case(&self.username), title_case(role))
            }
            _ => title_case(&self.username),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// An inventory item from `GET /v1/items/`.
///
/// Read-only from the client's perspective; the list is replaced wholesale on
/// every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,

    pub item_name: String,

    /// Units in stock. The API guarantees ≥ 0.
    pub quantity: i64,

    /// Unit price; the API sends a decimal string.
    pub price: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Item {
    /// Stock badge shown next to the item.
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::from_quantity(self.quantity)
    }

    /// True when the item can be added to the cart.
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Item name in title case for display.
    pub fn display_name(&self) -> String {
        title_case(&self.item_name)
    }
}

/// Stock level bucket used by the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    /// `≤ 0` is out of stock, below [`LOW_STOCK_THRESHOLD`] is low.
    pub fn from_quantity(quantity: i64) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity < LOW_STOCK_THRESHOLD {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of stock",
            StockStatus::LowStock => "Low stock",
            StockStatus::InStock => "In stock",
        }
    }
}

// =============================================================================
// Auth Payloads
// =============================================================================

/// Body of `POST /v1/login/`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Body of `POST /v1/logout/`.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

// =============================================================================
// Sale Payloads
// =============================================================================

/// One line of a sale submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub item: ItemId,
    pub quantity: i64,
    pub price: Money,
}

/// Body of `POST /v1/sales/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub staff: UserId,
    pub sale_items: Vec<SaleLine>,
}

/// One line of a stock decrement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdateLine {
    pub item: ItemId,
    pub quantity: i64,
}

/// Body of `POST /v1/update-sales/`.
///
/// Built from the same cart snapshot as the [`SaleRequest`], without prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdateRequest {
    pub staff: UserId,
    pub sale_items: Vec<StockUpdateLine>,
}

// =============================================================================
// Display Helpers
// =============================================================================

/// Upper-cases the first letter of each space-separated word and lower-cases
/// the rest.
///
/// ```rust
/// use tally_core::types::title_case;
///
/// assert_eq!(title_case("COCA cola"), "Coca Cola");
/// ```
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_decodes_api_shape() {
        let json = r#"{
            "item_id": 7,
            "item_name": "orange juice",
            "price": "2.50",
            "quantity": 3,
            "is_active": true,
            "created_at": "2025-01-01T10:00:00Z",
            "updated_at": "2025-01-02T10:00:00Z"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.item_id, 7);
        assert_eq!(item.price.cents(), 250);
        assert_eq!(item.stock_status(), StockStatus::LowStock);
        assert_eq!(item.display_name(), "Orange Juice");
    }

    #[test]
    fn test_stock_status_buckets() {
        assert_eq!(StockStatus::from_quantity(0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::from_quantity(-1), StockStatus::OutOfStock);
        assert_eq!(StockStatus::from_quantity(4), StockStatus::LowStock);
        assert_eq!(StockStatus::from_quantity(5), StockStatus::InStock);
    }

    #[test]
    fn test_sale_request_wire_shape() {
        let sale = SaleRequest {
            staff: 3,
            sale_items: vec![SaleLine {
                item: 1,
                quantity: 2,
                price: Money::from_cents(1000),
            }],
        };
        let value = serde_json::to_value(&sale).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "staff": 3,
                "sale_items": [{"item": 1, "quantity": 2, "price": 10.0}]
            })
        );
    }

    #[test]
    fn test_user_display_name() {
        let user = User {
            user_id: 1,
            username: "alice SMITH".to_string(),
            email: None,
            role: Some("cashier".to_string()),
        };
        assert_eq!(user.display_name(), "Alice Smith (Cashier)");
    }

    #[test]
    fn test_title_case_keeps_spacing() {
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("a  b"), "A  B");
    }
}
