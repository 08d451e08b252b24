//! Error types for bazaar-hub

use thiserror::Error;

/// Result type for bazaar-hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while opening or shutting down a hub
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid hub config: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error("storage error: {0}")]
    Store(#[from] bazaar_db::Error),

    #[error("cooldown error: {0}")]
    Cooldown(#[from] bazaar_cooldown::Error),
}

// Compile-time check that Error is Send + Sync.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
