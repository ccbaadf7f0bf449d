//! Session-specific error types.

use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Login attempted against a deactivated account. The session is left
    /// untouched and nothing is written to storage.
    #[error("Account is deactivated")]
    RejectedCredential,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(#[from] campus_types::ApiError),
}
