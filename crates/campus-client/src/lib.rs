//! Client facade wiring the Campus core together.
//!
//! The host UI holds one `CampusClient`: identity questions go to
//! [`session`](CampusClient::session), chat data to
//! [`sync`](CampusClient::sync). Nothing in here renders or routes.

use std::sync::Arc;

use campus_api::ApiClient;
use campus_config::CampusConfig;
use campus_session::{FileStorage, LogNotifier, Notifier, SessionState, SessionStore};
use campus_sync::ConversationSync;
use campus_types::CampusError;
use campus_types::gateway::Gateway;
use tokio::sync::watch;

/// The assembled Campus core.
pub struct CampusClient {
    session: Arc<SessionStore>,
    sync: ConversationSync,
}

impl CampusClient {
    /// Build the core from resolved configuration, with notifications
    /// routed to the log.
    pub fn new(config: CampusConfig) -> Result<Self, CampusError> {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    /// Build the core with the host UI's own notification channel.
    pub fn with_notifier(
        config: CampusConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CampusError> {
        let gateway: Arc<dyn Gateway> = Arc::new(ApiClient::with_timeouts(
            config.base_url.as_str(),
            config.read_timeout,
            config.send_timeout,
        )?);
        let storage = Arc::new(FileStorage::new(config.data_dir));
        let session = Arc::new(SessionStore::new(storage, gateway.clone(), notifier));
        let sync = ConversationSync::new(gateway);
        Ok(Self { session, sync })
    }

    /// Restore any persisted session. Call once at startup, before the
    /// first screen decides where to route.
    pub async fn start(&self) {
        self.session.load_initial().await;
    }

    /// Authentication and profile state.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Conversation listings and messaging.
    pub fn sync(&self) -> &ConversationSync {
        &self.sync
    }

    /// Subscribe to session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }
}
