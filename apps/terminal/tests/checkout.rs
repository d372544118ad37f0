//! Item fetching, cart handling and the two-step checkout.

mod common;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{bodies, logged_in, mount_items, setup, START};
use tally_core::cart::CartOutcome;
use tally_core::error::{AuthError, ClientError};
use tally_core::money::Money;
use tally_core::session::{PersistedSession, SessionAction};
use tally_store::Persistence;
use tally_terminal::views::sale::{
    CART_EMPTY, OUT_OF_STOCK, SALE_SUCCEEDED, STAFF_MISSING, TOKEN_MISSING,
};
use tally_terminal::views::{SaleView, StepOutcome};
use tally_terminal::workflows::inventory;

#[tokio::test]
async fn test_fetch_items_replaces_list_and_persists() {
    let app = logged_in().await;
    Mock::given(method("GET"))
        .and(path("/v1/items/"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::items_body()))
        .expect(1)
        .mount(&app.server)
        .await;

    assert_eq!(inventory::fetch_items(&app.state).await.unwrap(), 3);

    let state = app.state.inventory().await;
    assert_eq!(state.items.len(), 3);
    assert!(!state.is_loading);
    assert!(state.error.is_none());

    let restored = Persistence::new(&app.db).load_on_start().await.unwrap();
    assert_eq!(restored.items.len(), 3);
}

#[tokio::test]
async fn test_fetch_items_without_token_sends_nothing() {
    let app = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/items/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.server)
        .await;

    let err = inventory::fetch_items(&app.state).await.unwrap_err();
    assert_eq!(err, ClientError::Auth(AuthError::AuthRequired));
    assert_eq!(app.state.inventory().await.error, Some(err));
}

#[tokio::test]
async fn test_cart_edits_are_persisted() {
    let app = logged_in().await;
    mount_items(&app.server).await;

    let mut view = SaleView::new("$");
    view.mount(&app.state).await.unwrap();

    assert_eq!(view.add_to_cart(&app.state, 1).await, CartOutcome::Changed);
    assert_eq!(view.add_to_cart(&app.state, 1).await, CartOutcome::Changed);
    assert_eq!(view.add_to_cart(&app.state, 2).await, CartOutcome::Changed);
    assert_eq!(view.grand_total(), Money::from_cents(2500));

    view.update_quantity(&app.state, 1, -5).await;
    assert_eq!(view.cart().line(1).map(|l| l.quantity), Some(1));

    let mut remounted = SaleView::new("$");
    remounted.mount(&app.state).await.unwrap();
    assert_eq!(remounted.cart(), view.cart());

    view.remove_item(&app.state, 2).await;
    assert_eq!(view.cart().item_count(), 1);
}

#[tokio::test]
async fn test_out_of_stock_add_alerts() {
    let app = logged_in().await;
    mount_items(&app.server).await;

    let mut view = SaleView::new("$");
    view.mount(&app.state).await.unwrap();

    assert_eq!(view.add_to_cart(&app.state, 3).await, CartOutcome::OutOfStock);
    assert!(view.cart().is_empty());
    assert_eq!(view.take_alert().as_deref(), Some(OUT_OF_STOCK));
}

#[tokio::test]
async fn test_checkout_success_clears_cart_and_refetches() {
    let app = logged_in().await;
    mount_items(&app.server).await;
    Mock::given(method("POST"))
        .and(path("/v1/sales/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sale_id": 91})))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/update-sales/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updated": 2})))
        .expect(1)
        .mount(&app.server)
        .await;

    let mut view = SaleView::new("$");
    view.mount(&app.state).await.unwrap();
    view.add_to_cart(&app.state, 1).await;
    view.add_to_cart(&app.state, 1).await;
    view.add_to_cart(&app.state, 2).await;

    let report = view.handle_both_actions(&app.state).await;
    assert_eq!(report.sale, StepOutcome::Succeeded);
    assert_eq!(report.stock, StepOutcome::Succeeded);
    assert!(report.is_consistent());

    assert!(view.cart().is_empty());
    assert_eq!(view.banner().map(|b| b.message.as_str()), Some(SALE_SUCCEEDED));
    assert!(Persistence::new(&app.db).load_cart().await.unwrap().is_empty());

    let inventory = app.state.inventory().await;
    assert_eq!(inventory.last_sale, Some(json!({"sale_id": 91})));
    assert_eq!(inventory.last_stock_update, Some(json!({"updated": 2})));

    // mount + refetch after the stock update
    assert_eq!(bodies(&app.server, "/v1/items/").await.len(), 2);

    let sale = &bodies(&app.server, "/v1/sales/").await[0];
    assert_eq!(
        sale,
        &json!({
            "staff": 4,
            "sale_items": [
                {"item": 1, "quantity": 2, "price": 10.0},
                {"item": 2, "quantity": 1, "price": 5.0}
            ]
        })
    );
}

#[tokio::test]
async fn test_failed_sale_still_updates_stock() {
    let app = logged_in().await;
    mount_items(&app.server).await;
    Mock::given(method("POST"))
        .and(path("/v1/sales/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "Item 1 is inactive."})))
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/update-sales/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&app.server)
        .await;

    let mut view = SaleView::new("$");
    view.mount(&app.state).await.unwrap();
    view.add_to_cart(&app.state, 1).await;
    view.add_to_cart(&app.state, 1).await;

    let report = view.handle_both_actions(&app.state).await;
    assert!(matches!(report.sale, StepOutcome::Failed(_)));
    assert_eq!(report.stock, StepOutcome::Succeeded);
    assert!(!report.is_consistent());
    assert_eq!(
        view.take_alert().as_deref(),
        Some("Sale execution failed: Item 1 is inactive.")
    );

    let stock = &bodies(&app.server, "/v1/update-sales/").await[0];
    assert_eq!(
        stock,
        &json!({"staff": 4, "sale_items": [{"item": 1, "quantity": 2}]})
    );
}

#[tokio::test]
async fn test_failed_stock_update_keeps_sale_result() {
    let app = logged_in().await;
    mount_items(&app.server).await;
    Mock::given(method("POST"))
        .and(path("/v1/sales/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sale_id": 5})))
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/update-sales/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.server)
        .await;

    let mut view = SaleView::new("$");
    view.mount(&app.state).await.unwrap();
    view.add_to_cart(&app.state, 2).await;

    let report = view.handle_both_actions(&app.state).await;
    assert_eq!(report.sale, StepOutcome::Succeeded);
    match report.stock {
        StepOutcome::Failed(err) => assert_eq!(err.message(), "Failed to update sales."),
        other => panic!("unexpected stock outcome: {:?}", other),
    }
    assert!(view.cart().is_empty());
}

#[tokio::test]
async fn test_empty_cart_checkout_sends_nothing() {
    let app = logged_in().await;
    mount_items(&app.server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.server)
        .await;

    let mut view = SaleView::new("$");
    view.mount(&app.state).await.unwrap();

    let report = view.handle_both_actions(&app.state).await;
    assert_eq!(report.sale, StepOutcome::Skipped(CART_EMPTY.into()));
    assert_eq!(report.stock, StepOutcome::Skipped(CART_EMPTY.into()));
    assert_eq!(view.take_alert().as_deref(), Some(CART_EMPTY));
}

#[tokio::test]
async fn test_checkout_after_logout_skips_sale() {
    let app = logged_in().await;
    mount_items(&app.server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.server)
        .await;

    let mut view = SaleView::new("$");
    view.mount(&app.state).await.unwrap();
    view.add_to_cart(&app.state, 1).await;
    view.logout(&app.state).await;

    let report = view.handle_both_actions(&app.state).await;
    assert_eq!(report.sale, StepOutcome::Skipped(TOKEN_MISSING.into()));
    assert_eq!(
        report.stock,
        StepOutcome::Failed(ClientError::Auth(AuthError::AuthRequired))
    );
    assert_eq!(view.cart().item_count(), 1);
}

#[tokio::test]
async fn test_checkout_without_user_sends_nothing() {
    let app = logged_in().await;
    mount_items(&app.server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.server)
        .await;

    let mut view = SaleView::new("$");
    view.mount(&app.state).await.unwrap();
    view.add_to_cart(&app.state, 1).await;

    app.state
        .dispatch_session(SessionAction::Hydrate(PersistedSession {
            token: Some("access-1".into()),
            user: None,
            is_authenticated: true,
            last_activity: Some(START),
        }))
        .await;

    let report = view.handle_both_actions(&app.state).await;
    assert_eq!(report.sale, StepOutcome::Skipped(STAFF_MISSING.into()));
    assert_eq!(report.stock, StepOutcome::Skipped(STAFF_MISSING.into()));
    assert_eq!(view.take_alert().as_deref(), Some(STAFF_MISSING));
    assert_eq!(view.cart().item_count(), 1);
}

#[tokio::test]
async fn test_search_and_render() {
    let app = logged_in().await;
    mount_items(&app.server).await;

    let mut view = SaleView::new("€");
    view.mount(&app.state).await.unwrap();

    view.search("JUICE");
    let visible = view.visible_items(&app.state).await;
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].item_id, 3);

    let text = view.render(&app.state).await;
    assert!(text.contains("Orange Juice"));
    assert!(text.contains("Out of stock"));
    assert!(!text.contains("Coffee"));
    assert!(text.contains("Alice (Cashier)"));
    assert!(text.contains("Total: €0.00"));
}
