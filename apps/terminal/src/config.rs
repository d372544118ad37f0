//! # Terminal Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_API_BASE_URL=https://pos.example.com/api                     │
//! │     TALLY_DB_PATH=/var/lib/tally/tally.db                              │
//! │     TALLY_INACTIVITY_LIMIT_SECS=3600                                   │
//! │     TALLY_POLL_INTERVAL_SECS=5                                         │
//! │     TALLY_REQUEST_TIMEOUT_SECS=30                                      │
//! │     TALLY_CURRENCY_SYMBOL=$                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path> / TALLY_CONFIG, else                               │
//! │     ~/.config/tally-pos/tally.toml (Linux)                             │
//! │     ~/Library/Application Support/com.tally.pos/tally.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "http://127.0.0.1:8000"
//! request_timeout_secs = 30
//!
//! [session]
//! inactivity_limit_secs = 3600
//! poll_interval_secs = 5
//!
//! [storage]
//! database_path = "/var/lib/tally/tally.db"
//!
//! [display]
//! currency_symbol = "$"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use tally_core::{INACTIVITY_LIMIT_MS, POLL_INTERVAL_SECS};

use crate::error::{AppError, AppResult};

const CONFIG_FILE: &str = "tally.toml";
const DATABASE_FILE: &str = "tally.db";

// =============================================================================
// Sections
// =============================================================================

/// REST API connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Auto-logout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_inactivity_limit")]
    pub inactivity_limit_secs: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_inactivity_limit() -> u64 {
    (INACTIVITY_LIMIT_MS / 1000) as u64
}

fn default_poll_interval() -> u64 {
    POLL_INTERVAL_SECS
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            inactivity_limit_secs: default_inactivity_limit(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

/// Local storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Defaults to `tally.db` in the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (an explicit path must exist)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else if explicit {
                return Err(AppError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        self.base_url()?;

        if self.session.inactivity_limit_secs == 0 {
            return Err(AppError::config("inactivity_limit_secs must be greater than 0"));
        }
        if self.session.poll_interval_secs == 0 {
            return Err(AppError::config("poll_interval_secs must be greater than 0"));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(AppError::config("request_timeout_secs must be greater than 0"));
        }

        Ok(())
    }

    /// Applies overrides read through `lookup` (the process environment in
    /// production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TALLY_API_BASE_URL") {
            debug!(url = %url, "Overriding API base URL from environment");
            self.api.base_url = url;
        }

        if let Some(path) = lookup("TALLY_DB_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(symbol) = lookup("TALLY_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }

        override_u64(&lookup, "TALLY_INACTIVITY_LIMIT_SECS", &mut self.session.inactivity_limit_secs);
        override_u64(&lookup, "TALLY_POLL_INTERVAL_SECS", &mut self.session.poll_interval_secs);
        override_u64(&lookup, "TALLY_REQUEST_TIMEOUT_SECS", &mut self.api.request_timeout_secs);
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Parsed base URL. Only http and https are accepted.
    pub fn base_url(&self) -> AppResult<Url> {
        let url = Url::parse(&self.api.base_url).map_err(|e| {
            AppError::config(format!("invalid api.base_url '{}': {}", self.api.base_url, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(AppError::config(format!(
                "api.base_url must use http or https, got: {}",
                other
            ))),
        }
    }

    /// Database file, creating the platform data directory when defaulted.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }

        let dirs = project_dirs()
            .ok_or_else(|| AppError::config("could not determine app data directory"))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join(DATABASE_FILE))
    }

    pub fn inactivity_limit(&self) -> Duration {
        Duration::from_secs(self.session.inactivity_limit_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.session.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "tally", "pos")
}

fn override_u64<F>(lookup: &F, key: &str, target: &mut u64)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse::<u64>() {
            Ok(value) => *target = value,
            Err(_) => warn!(key = %key, value = %raw, "Ignoring non-numeric override"),
        }
    }
}
