//! # Tally POS Terminal
//!
//! Line-oriented point-of-sale client for the Tally REST backend.
//!
//! ## Module Structure
//! ```text
//! tally_terminal/
//! ├── lib.rs          ◄─── You are here (CLI flags, startup)
//! ├── config.rs       ◄─── AppConfig: defaults → tally.toml → TALLY_* env
//! ├── error.rs        ◄─── AppError
//! ├── state/          ◄─── AppState (session + inventory behind Mutexes)
//! ├── workflows/      ◄─── auth and inventory async operations
//! ├── monitor.rs      ◄─── auto-logout background task
//! ├── views/          ◄─── login and sale view models
//! └── repl.rs         ◄─── command loop
//! ```

pub mod config;
pub mod error;
pub mod monitor;
pub mod repl;
pub mod state;
pub mod views;
pub mod workflows;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tally_api::{ApiClient, ApiConfig};
use tally_core::clock::SystemClock;
use tally_core::inactivity::InactivityPolicy;
use tally_store::{Database, DbConfig, DbError, Persistence};

use config::AppConfig;
use error::AppResult;
use repl::Terminal;
use state::AppState;

/// Command-line flags. Each one overrides the matching config value.
#[derive(Debug, Parser)]
#[command(name = "tally-terminal")]
#[command(version)]
#[command(about = "Tally POS terminal client")]
pub struct Cli {
    /// Config file (default: tally.toml in the platform config directory)
    #[arg(long, env = "TALLY_CONFIG")]
    pub config: Option<PathBuf>,

    /// REST API base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Local database file
    #[arg(long)]
    pub db: Option<PathBuf>,
}

/// Runs the terminal until `quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize logging (stderr, RUST_LOG or the default filter)         │
/// │  2. Load AppConfig and apply CLI flags                                  │
/// │  3. Open the SQLite store, run migrations, check it answers             │
/// │  4. Restore persisted session and items into AppState                  │
/// │  5. Build the API client                                                │
/// │  6. Run the command loop on stdin / stdout                              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> AppResult<()> {
    init_tracing();

    let mut config = AppConfig::load(cli.config)?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if let Some(db) = cli.db {
        config.storage.database_path = Some(db);
    }
    config.validate()?;

    let db_path = config.database_path()?;
    info!(?db_path, "Opening local store");
    let db = Database::new(DbConfig::new(db_path)).await?;
    if !db.health_check().await {
        db.close().await;
        return Err(DbError::ConnectionFailed("local store is not responding".into()).into());
    }
    let persist = Persistence::new(&db);
    let loaded = persist.load_on_start().await?;

    let base_url = config.base_url()?;
    info!(base_url = %base_url, "Using API");
    let api = ApiClient::new(ApiConfig::new(base_url).timeout(config.request_timeout()))?;

    let state = Arc::new(AppState::new(
        api,
        persist,
        Arc::new(SystemClock),
        InactivityPolicy::new(config.inactivity_limit()),
    ));
    state.hydrate(loaded).await;

    let mut terminal = Terminal::new(
        state,
        config.display.currency_symbol.clone(),
        config.poll_interval(),
    );
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    terminal.run(stdin, tokio::io::stdout()).await?;

    db.close().await;
    info!("Goodbye");
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so they stay out of the view output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
