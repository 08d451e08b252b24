//! Error types for bazaar-cooldown

use thiserror::Error;

/// Errors raised while saving ledger state or settings
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Store(#[from] bazaar_db::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
