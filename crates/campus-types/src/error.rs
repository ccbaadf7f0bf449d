//! Error hierarchy for Campus.

use thiserror::Error;

/// Top-level error type for all Campus operations.
#[derive(Debug, Error)]
pub enum CampusError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors from the campus REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered but flagged the request as failed (truthy
    /// `error` field or `success: false`).
    #[error("Backend reported failure: {message}")]
    Backend { message: String },

    /// The response parsed as JSON but is missing fields the contract
    /// requires (`success`, `users`, `message`, ...).
    #[error("Malformed response: {message}")]
    Malformed { message: String },

    /// The endpoint does not exist on this backend deployment.
    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Server error: {status} {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
