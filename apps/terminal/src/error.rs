//! # Application Error Type
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Terminal                           │
//! │                                                                         │
//! │  Startup                          Runtime                               │
//! │  ───────                          ───────                               │
//! │  bad tally.toml ──► AppError::Config ──► main prints, exit code 1       │
//! │  DbError        ──► AppError::Store  ──► main prints, exit code 1       │
//! │                                                                         │
//! │                                   ClientError ──► view error line       │
//! │                                   DbError (writes) ──► error! log       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tally_core::error::ClientError;
use tally_store::DbError;
use thiserror::Error;

/// Errors that can stop the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The config file is not valid TOML.
    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] DbError),

    /// A client workflow failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config(message.into())
    }
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
