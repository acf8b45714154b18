//! Error types for the ledger core
//!
//! Invalid blocks and transactions are not errors; they are reported through
//! `ValidationResult` or a `false` return. These variants cover misuse of the
//! crate's configuration surface.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
