//! Error types for bazaar-catalog

use thiserror::Error;

/// Errors raised while building, migrating or decoding entries
#[derive(Error, Debug)]
pub enum Error {
    #[error("Entry {key:?} is invalid: {reason}")]
    InvalidEntry { key: String, reason: String },

    #[error("Cannot price {key}: market value {value}")]
    Pricing { key: String, value: f64 },

    #[error("Entry {key:?} is not a JSON object")]
    NotAnObject { key: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
