//! Error types for persistence operations.

use thiserror::Error;

/// Errors that can occur while reading or writing blobs.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blob name that cannot be mapped to a file.
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    /// Write refused by the backing store.
    #[error("Write rejected: {0}")]
    WriteRejected(String),
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, Error>;
