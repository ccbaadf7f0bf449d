//! Fire-and-forget user-facing notifications.
//!
//! The core never waits for acknowledgement; it hands the host UI a
//! severity, a short title, and a short body and moves on.

use campus_types::truncate_str;

/// Display ceiling for notification bodies.
const MAX_BODY_BYTES: usize = 200;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient notification channel to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, title: &str, body: &str);
}

/// Notifier that routes signals to the log. The default when the host UI
/// has not installed its own channel.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, severity: Severity, title: &str, body: &str) {
        let body = truncate_str(body, MAX_BODY_BYTES);
        match severity {
            Severity::Error | Severity::Warning => tracing::warn!("{title}: {body}"),
            Severity::Info | Severity::Success => tracing::info!("{title}: {body}"),
        }
    }
}
