//! # Inventory
//!
//! Item list plus the raw responses of the last sale and stock update.
//!
//! ```text
//!   Pending ──► is_loading = true, error cleared
//!   ItemsFetched(items) ──► items replaced wholesale
//!   SaleExecuted(json) ──► last_sale
//!   StockUpdated(json) ──► last_stock_update
//!   Rejected(err) ──► error, is_loading = false
//!   Hydrate(items) ──► items restored from storage
//! ```
//!
//! Only `items` is persisted.

use serde_json::Value;

use crate::error::ClientError;
use crate::types::{Item, ItemId};

/// Inventory and sales state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryState {
    pub items: Vec<Item>,
    pub last_sale: Option<Value>,
    pub last_stock_update: Option<Value>,
    pub is_loading: bool,
    pub error: Option<ClientError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InventoryAction {
    Pending,
    ItemsFetched(Vec<Item>),
    SaleExecuted(Value),
    StockUpdated(Value),
    Rejected(ClientError),
    Hydrate(Vec<Item>),
}

impl InventoryState {
    pub fn reduce(&mut self, action: InventoryAction) {
        match action {
            InventoryAction::Pending => {
                self.is_loading = true;
                self.error = None;
            }
            InventoryAction::ItemsFetched(items) => {
                self.items = items;
                self.is_loading = false;
            }
            InventoryAction::SaleExecuted(response) => {
                self.last_sale = Some(response);
                self.is_loading = false;
            }
            InventoryAction::StockUpdated(response) => {
                self.last_stock_update = Some(response);
                self.is_loading = false;
            }
            InventoryAction::Rejected(error) => {
                self.error = Some(error);
                self.is_loading = false;
            }
            InventoryAction::Hydrate(items) => {
                self.items = items;
            }
        }
    }

    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    /// Items whose name contains `term`, ignoring case. A blank term matches
    /// everything.
    pub fn search(&self, term: &str) -> Vec<&Item> {
        search_items(&self.items, term)
    }
}

/// Case-insensitive substring filter on `item_name`.
pub fn search_items<'a>(items: &'a [Item], term: &str) -> Vec<&'a Item> {
    let needle = term.trim().to_lowercase();
    items
        .iter()
        .filter(|i| needle.is_empty() || i.item_name.to_lowercase().contains(&needle))
        .collect()
}
