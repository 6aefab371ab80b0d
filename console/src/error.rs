//! Unified error handling for the console.

use crate::config::ConfigError;

/// Console error type.
///
/// Command errors are printed and the session continues. Startup errors end it.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] gridline_engine::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("No row {0} on this page")]
    UnknownRow(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

/// Result type alias for console operations.
pub type Result<T> = std::result::Result<T, ConsoleError>;
