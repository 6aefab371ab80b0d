//! Error types for the Gridline engine.
//!
//! Derivation itself never fails. Errors only come from the edges where host
//! input is decoded: JSON records, column lists and grid configuration.

use thiserror::Error;

/// All possible errors from the Gridline engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Record decoding
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("missing identifier field: {0}")]
    MissingIdentifier(String),

    #[error("invalid identifier in field '{field}': expected integer or string, got {got}")]
    InvalidIdentifier { field: String, got: String },

    // Configuration
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("duplicate column key: {0}")]
    DuplicateColumn(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
