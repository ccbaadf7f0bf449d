//! The process-wide session store.
//!
//! Single source of truth for "who is logged in". Every mutation commits
//! to memory first and then writes through to durable storage, so a
//! restart reproduces the last successfully persisted state. State changes
//! fan out to subscribers over a watch channel.

use std::sync::Arc;

use campus_types::UserRecord;
use campus_types::gateway::Gateway;
use tokio::sync::watch;

use crate::error::SessionError;
use crate::notify::{Notifier, Severity};
use crate::state::{SessionState, UserPatch};
use crate::storage::SessionStorage;

/// Authentication/session state with durable persistence.
///
/// Operations are not mutually excluded: two in-flight updates race and
/// the last commit wins, for memory and storage alike. Callers that need
/// ordering must serialize their own calls.
pub struct SessionStore {
    state: watch::Sender<SessionState>,
    storage: Arc<dyn SessionStorage>,
    gateway: Arc<dyn Gateway>,
    notifier: Arc<dyn Notifier>,
}

impl SessionStore {
    /// Create a store in the `Loading` state. Call [`load_initial`] before
    /// acting on the session.
    ///
    /// [`load_initial`]: SessionStore::load_initial
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        gateway: Arc<dyn Gateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            state: watch::Sender::new(SessionState::Loading),
            storage,
            gateway,
            notifier,
        }
    }

    /// Subscribe to session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<UserRecord> {
        self.state.borrow().user().cloned()
    }

    /// Restore a persisted session, if one exists.
    ///
    /// Never fails: an unreadable or absent record degrades to `LoggedOut`
    /// with a log line. Until this resolves, the store reports `Loading`.
    pub async fn load_initial(&self) {
        let next = match self.storage.load().await {
            Ok(Some(raw)) => match serde_json::from_str::<UserRecord>(&raw) {
                Ok(user) => {
                    tracing::debug!(user_id = user.id, "restored persisted session");
                    SessionState::LoggedIn(user)
                }
                Err(e) => {
                    tracing::warn!("Discarding unreadable session record: {e}");
                    SessionState::LoggedOut
                }
            },
            Ok(None) => SessionState::LoggedOut,
            Err(e) => {
                tracing::warn!("Failed to read session storage: {e}");
                SessionState::LoggedOut
            }
        };
        self.state.send_replace(next);
    }

    /// Commit a candidate user as the logged-in session.
    ///
    /// Deactivated accounts are rejected without touching state or
    /// storage. Otherwise the record is fully defaulted and committed to
    /// memory, then written through. A failed storage write is logged but
    /// does not fail the login: the session stays usable in memory and the
    /// next successful write heals storage.
    pub async fn login(&self, candidate: UserRecord) -> Result<(), SessionError> {
        if candidate.is_deactivated() {
            self.notifier.notify(
                Severity::Error,
                "Sign-in failed",
                "This account has been deactivated. Contact the registrar's office.",
            );
            return Err(SessionError::RejectedCredential);
        }

        let user = candidate.normalized();
        self.state.send_replace(SessionState::LoggedIn(user.clone()));
        self.write_through(&user).await;
        Ok(())
    }

    /// End the session: clear memory and delete the persisted record.
    /// Idempotent.
    pub async fn logout(&self) {
        self.state.send_replace(SessionState::LoggedOut);
        if let Err(e) = self.storage.remove().await {
            tracing::warn!("Failed to delete persisted session: {e}");
        }
    }

    /// Clear the in-memory session only, leaving storage untouched.
    ///
    /// Used right before a fresh login attempt so stale state cannot leak
    /// into the new session while the cached record survives on disk.
    pub fn clear_user(&self) {
        self.state.send_replace(SessionState::LoggedOut);
    }

    /// Shallow-merge a partial update over the logged-in user and write
    /// through. Returns `false` (no-op) when nobody is logged in.
    pub async fn update_user(&self, patch: UserPatch) -> bool {
        let Some(mut user) = self.current_user() else {
            return false;
        };
        patch.apply(&mut user);
        self.state.send_replace(SessionState::LoggedIn(user.clone()));
        self.write_through(&user).await;
        true
    }

    /// Record the one-time policy consent decision and write through.
    /// Returns `false` (no-op) when nobody is logged in.
    pub async fn update_policy_status(&self, accepted: bool) -> bool {
        let Some(mut user) = self.current_user() else {
            return false;
        };
        user.policy_accepted = u8::from(accepted);
        self.state.send_replace(SessionState::LoggedIn(user.clone()));
        self.write_through(&user).await;
        true
    }

    /// Re-fetch the logged-in user from the backend and recommit it
    /// through the full login path, so refresh and login share one
    /// normalization.
    ///
    /// Resolves `false` without touching the session on any failure —
    /// including a deactivation reported mid-session, which rejects the
    /// refresh exactly like a login would.
    pub async fn refresh_user(&self) -> bool {
        let Some(user) = self.current_user() else {
            return false;
        };
        match self.gateway.fetch_user(user.id).await {
            Ok(fresh) => self.login(fresh).await.is_ok(),
            Err(e) => {
                tracing::warn!("Session refresh failed: {e}");
                false
            }
        }
    }

    /// Change the account password on the backend.
    ///
    /// Never mutates the session record; the outcome reaches the user
    /// through the notification channel and the returned flag.
    pub async fn change_password(&self, current: &str, next: &str) -> bool {
        let Some(user) = self.current_user() else {
            return false;
        };
        match self.gateway.change_password(user.id, current, next).await {
            Ok(()) => {
                self.notifier.notify(
                    Severity::Success,
                    "Password changed",
                    "Your password has been updated.",
                );
                true
            }
            Err(e) => {
                tracing::warn!("Password change failed: {e}");
                self.notifier
                    .notify(Severity::Error, "Password change failed", &e.to_string());
                false
            }
        }
    }

    async fn write_through(&self, user: &UserRecord) {
        let raw = match serde_json::to_string(user) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize session record: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.store(&raw).await {
            tracing::warn!("Failed to persist session: {e}");
        }
    }
}
