//! Inventory and sales workflows.
//!
//! Each one requires the session token up front; without it the call fails
//! with `AuthRequired` and no request goes out.

use serde_json::Value;
use tracing::{debug, info};

use tally_core::error::CoreResult;
use tally_core::inventory::InventoryAction;
use tally_core::types::{SaleRequest, StockUpdateRequest};
use tally_core::validation::require_token;

use crate::state::AppState;

/// Replaces the item list with the server's. Returns the item count.
pub async fn fetch_items(state: &AppState) -> CoreResult<usize> {
    let token = token_or_reject(state).await?;
    state.dispatch_inventory(InventoryAction::Pending).await;

    match state.api().fetch_items(Some(&token)).await {
        Ok(items) => {
            let count = items.len();
            state
                .dispatch_inventory(InventoryAction::ItemsFetched(items))
                .await;
            debug!(count, "Inventory refreshed");
            Ok(count)
        }
        Err(err) => reject(state, err).await,
    }
}

/// Submits a sale. The raw response is kept as `last_sale`.
pub async fn execute_sale(state: &AppState, sale: &SaleRequest) -> CoreResult<Value> {
    let token = token_or_reject(state).await?;
    state.dispatch_inventory(InventoryAction::Pending).await;

    match state.api().execute_sale(sale, Some(&token)).await {
        Ok(response) => {
            info!(lines = sale.sale_items.len(), staff = sale.staff, "Sale recorded");
            state
                .dispatch_inventory(InventoryAction::SaleExecuted(response.clone()))
                .await;
            Ok(response)
        }
        Err(err) => reject(state, err).await,
    }
}

/// Decrements stock. The raw response is kept as `last_stock_update`.
pub async fn update_sales(state: &AppState, update: &StockUpdateRequest) -> CoreResult<Value> {
    let token = token_or_reject(state).await?;
    state.dispatch_inventory(InventoryAction::Pending).await;

    match state.api().update_sales(update, Some(&token)).await {
        Ok(response) => {
            info!(lines = update.sale_items.len(), "Stock updated");
            state
                .dispatch_inventory(InventoryAction::StockUpdated(response.clone()))
                .await;
            Ok(response)
        }
        Err(err) => reject(state, err).await,
    }
}

async fn token_or_reject(state: &AppState) -> CoreResult<String> {
    let session = state.session().await;
    match require_token(session.token()) {
        Ok(token) => Ok(token.to_string()),
        Err(err) => reject(state, err).await,
    }
}

async fn reject<T>(state: &AppState, err: tally_core::error::ClientError) -> CoreResult<T> {
    state
        .dispatch_inventory(InventoryAction::Rejected(err.clone()))
        .await;
    Err(err)
}
