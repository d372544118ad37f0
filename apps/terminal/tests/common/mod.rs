//! Shared harness: a mock REST server, an in-memory store and a manual clock.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tally_api::{ApiClient, ApiConfig};
use tally_core::clock::ManualClock;
use tally_core::inactivity::InactivityPolicy;
use tally_store::{Database, DbConfig, Persistence};
use tally_terminal::state::AppState;

/// 2025-01-01T00:00:00Z
pub const START: i64 = 1_735_689_600_000;

pub struct TestApp {
    pub server: MockServer,
    pub db: Database,
    pub clock: ManualClock,
    pub state: Arc<AppState>,
}

pub async fn setup() -> TestApp {
    let server = MockServer::start().await;
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let clock = ManualClock::new(START);

    let api = ApiClient::new(ApiConfig::new(Url::parse(&server.uri()).unwrap())).unwrap();
    let state = Arc::new(AppState::new(
        api,
        Persistence::new(&db),
        Arc::new(clock.clone()),
        InactivityPolicy::default(),
    ));

    TestApp {
        server,
        db,
        clock,
        state,
    }
}

pub fn login_body() -> Value {
    json!({
        "user": {"user_id": 4, "username": "alice", "role": "Cashier"},
        "access_token": "access-1",
        "refresh_token": "refresh-1"
    })
}

pub fn items_body() -> Value {
    json!([
        {"item_id": 1, "item_name": "coffee", "price": "10.00", "quantity": 20},
        {"item_id": 2, "item_name": "bagel", "price": "5.00", "quantity": 3},
        {"item_id": 3, "item_name": "orange juice", "price": "2.50", "quantity": 0}
    ])
}

pub async fn mount_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .mount(server)
        .await;
}

pub async fn mount_items(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/items/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items_body()))
        .mount(server)
        .await;
}

/// Logs in as alice through the real workflow.
pub async fn logged_in() -> TestApp {
    let app = setup().await;
    mount_login_ok(&app.server).await;
    tally_terminal::workflows::auth::login(&app.state, "alice", "secret")
        .await
        .unwrap();
    app
}

/// JSON bodies of the requests received on `route`.
pub async fn bodies(server: &MockServer, route: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == route)
        .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
        .collect()
}
