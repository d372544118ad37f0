//! # Application State
//!
//! One `AppState`, shared as `Arc<AppState>` between the terminal loop and
//! the auto-logout monitor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                        AppState                                  │  │
//! │  │                                                                  │  │
//! │  │  session:   Mutex<Session>          ◄── auth workflows, monitor  │  │
//! │  │  inventory: Mutex<InventoryState>   ◄── inventory workflows      │  │
//! │  │  api:       ApiClient               (clone-cheap, no lock)       │  │
//! │  │  persist:   Persistence             (SQLite pool, no lock)       │  │
//! │  │  clock:     Arc<dyn Clock>                                       │  │
//! │  │  policy:    InactivityPolicy                                     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Every dispatch = lock → reduce → save slice → unlock.                 │
//! │  The saved slice therefore always matches the order of steps.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info};

use tally_api::ApiClient;
use tally_core::clock::{Clock, Timestamp};
use tally_core::inactivity::InactivityPolicy;
use tally_core::inventory::{InventoryAction, InventoryState};
use tally_core::session::{Session, SessionAction};
use tally_store::{LoadedState, Persistence};

/// Shared application state.
pub struct AppState {
    session: Mutex<Session>,
    inventory: Mutex<InventoryState>,
    api: ApiClient,
    persist: Persistence,
    clock: Arc<dyn Clock>,
    policy: InactivityPolicy,
}

impl AppState {
    pub fn new(
        api: ApiClient,
        persist: Persistence,
        clock: Arc<dyn Clock>,
        policy: InactivityPolicy,
    ) -> Self {
        AppState {
            session: Mutex::new(Session::default()),
            inventory: Mutex::new(InventoryState::default()),
            api,
            persist,
            clock,
            policy,
        }
    }

    /// Applies the slices restored by `Persistence::load_on_start`.
    ///
    /// The cart is not part of `AppState`; the sale view loads it itself.
    pub async fn hydrate(&self, loaded: LoadedState) {
        self.session
            .lock()
            .await
            .reduce(SessionAction::Hydrate(loaded.session));
        self.inventory
            .lock()
            .await
            .reduce(InventoryAction::Hydrate(loaded.items));
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn persist(&self) -> &Persistence {
        &self.persist
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn policy(&self) -> InactivityPolicy {
        self.policy
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Snapshot of the session.
    pub async fn session(&self) -> Session {
        self.session.lock().await.clone()
    }

    /// Reduces one session action and saves the persisted slice.
    pub async fn dispatch_session(&self, action: SessionAction) -> Session {
        let mut session = self.session.lock().await;
        session.reduce(action);
        self.save_session(&session).await;
        session.clone()
    }

    /// Logs out if the session is authenticated and idle past the limit.
    ///
    /// Check and logout happen under one lock so an activity update cannot
    /// slip in between.
    pub async fn logout_if_idle(&self) -> bool {
        let now = self.clock.now();
        let mut session = self.session.lock().await;
        if !self.policy.should_logout(&session, now) {
            return false;
        }

        info!(
            last_activity = ?session.last_activity,
            limit_ms = self.policy.limit_ms(),
            "Session inactive, logging out"
        );
        session.reduce(SessionAction::Logout);
        self.save_session(&session).await;
        drop(session);

        self.clear_tokens().await;
        true
    }

    async fn save_session(&self, session: &Session) {
        if let Err(e) = self.persist.save_session(&session.to_persisted()).await {
            error!(error = %e, "Failed to persist session");
        }
    }

    /// Removes the stored tokens; failures are logged.
    pub async fn clear_tokens(&self) {
        if let Err(e) = self.persist.clear_tokens().await {
            error!(error = %e, "Failed to clear stored tokens");
        }
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Snapshot of the inventory.
    pub async fn inventory(&self) -> InventoryState {
        self.inventory.lock().await.clone()
    }

    /// Reduces one inventory action; a fetched list is saved.
    pub async fn dispatch_inventory(&self, action: InventoryAction) {
        let save_items = matches!(action, InventoryAction::ItemsFetched(_));
        let mut inventory = self.inventory.lock().await;
        inventory.reduce(action);

        if save_items {
            if let Err(e) = self.persist.save_items(&inventory.items).await {
                error!(error = %e, "Failed to persist items");
            }
        }
    }
}
