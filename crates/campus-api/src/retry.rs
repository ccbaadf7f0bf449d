//! Retry with exponential backoff for idempotent reads.
//!
//! Only GET requests go through the retry loop. `send_message` creates a
//! row on the backend and is never retried here; if a caller wants retry
//! semantics for it, that policy is theirs.

use campus_types::ApiError;
use rand::Rng;

/// Configuration for retry behavior on transient API errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_retries: u32,
    /// Initial delay in milliseconds before the first retry.
    pub initial_delay_ms: u64,
    /// Maximum delay in milliseconds between retries.
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each attempt.
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_factor: 2.0,
        }
    }
}

/// Returns `true` if the error is transient and the request should be retried.
///
/// Backend-level failures (`Backend`, `Malformed`, `NotFound`) are answers,
/// not outages, and retrying them would just repeat the same answer.
pub fn is_retryable(error: &ApiError) -> bool {
    matches!(
        error,
        ApiError::Server { .. } | ApiError::Network(_) | ApiError::Timeout
    )
}

/// Calculate the delay in milliseconds before the next retry attempt:
/// `initial_delay_ms * backoff_factor^attempt` with ±25% jitter, clamped
/// to `max_delay_ms`.
pub fn calculate_delay(config: &RetryConfig, attempt: u32) -> u64 {
    let base = config.initial_delay_ms as f64 * config.backoff_factor.powi(attempt as i32);
    let clamped = base.min(config.max_delay_ms as f64);

    let jitter_factor = rand::rng().random_range(0.75..=1.25);
    let jittered = clamped * jitter_factor;

    (jittered as u64).min(config.max_delay_ms)
}
