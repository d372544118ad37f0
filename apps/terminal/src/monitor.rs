//! # Auto-Logout Monitor
//!
//! Background task that logs the session out after a period of inactivity.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Monitor Loop                                         │
//! │                                                                         │
//! │   spawn() ──► every poll_interval:                                      │
//! │                 ├── not authenticated?  ──► exit (SessionEnded)         │
//! │                 ├── idle > limit?       ──► logout, exit (IdleLogout)   │
//! │                 └── otherwise           ──► keep waiting                │
//! │                                                                         │
//! │               shutdown signal ──► exit (Shutdown)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The terminal starts a monitor on login and shuts it down on logout, so at
//! most one runs at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Why the monitor loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    /// The session was idle past the limit and has been logged out.
    IdleLogout,
    /// The session ended some other way.
    SessionEnded,
    /// The owner asked the monitor to stop.
    Shutdown,
}

/// Handle to a running monitor.
pub struct MonitorHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<MonitorExit>,
}

impl MonitorHandle {
    /// True once the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the loop and waits for it.
    pub async fn shutdown(self) -> MonitorExit {
        let _ = self.shutdown_tx.send(()).await;
        self.join().await
    }

    /// Waits for the loop to exit on its own.
    pub async fn join(self) -> MonitorExit {
        match self.task.await {
            Ok(exit) => exit,
            Err(e) => {
                warn!(error = %e, "Inactivity monitor task failed");
                MonitorExit::Shutdown
            }
        }
    }
}

/// Starts the monitor.
pub fn spawn(state: Arc<AppState>, poll_interval: Duration) -> MonitorHandle {
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let task = tokio::spawn(run(state, poll_interval, shutdown_rx));
    MonitorHandle { shutdown_tx, task }
}

async fn run(
    state: Arc<AppState>,
    poll_interval: Duration,
    mut shutdown_rx: mpsc::Receiver<()>,
) -> MonitorExit {
    debug!(interval_ms = poll_interval.as_millis() as u64, "Inactivity monitor started");

    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if state.logout_if_idle().await {
                    info!("Logged out after inactivity");
                    return MonitorExit::IdleLogout;
                }
                if !state.session().await.is_authenticated {
                    debug!("Session ended, inactivity monitor stopping");
                    return MonitorExit::SessionEnded;
                }
            }
            _ = shutdown_rx.recv() => {
                debug!("Inactivity monitor shutting down");
                return MonitorExit::Shutdown;
            }
        }
    }
}
