//! Fetching and normalizing conversation data for display.

use std::sync::Arc;

use campus_types::gateway::{Gateway, GatewayFuture};
use campus_types::{ApiError, ChatMessage, Participant, ParticipantPage, SendMessage};

use crate::reconcile::{dedup_participants, total_unread};

/// How many conversations one unread scan covers.
const UNREAD_SCAN_LIMIT: u32 = 100;

/// How many active users a search filters over.
const SEARCH_SCAN_LIMIT: u32 = 100;

/// Outcome of a listing fetch.
///
/// Listing operations never fail outright — a screen can always render a
/// list — but callers that care can tell "empty because there is nothing"
/// from "empty because the fetch failed".
#[derive(Debug)]
pub enum ListOutcome {
    Loaded {
        participants: Vec<Participant>,
        has_more: bool,
    },
    Unavailable {
        reason: ApiError,
    },
}

impl ListOutcome {
    /// The display-ready list; empty when unavailable.
    pub fn participants(&self) -> &[Participant] {
        match self {
            ListOutcome::Loaded { participants, .. } => participants,
            ListOutcome::Unavailable { .. } => &[],
        }
    }

    /// Whether another page exists; `false` when unavailable.
    pub fn has_more(&self) -> bool {
        matches!(self, ListOutcome::Loaded { has_more: true, .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ListOutcome::Unavailable { .. })
    }
}

/// Reconciles remote conversation listings into display-ready state.
pub struct ConversationSync {
    gateway: Arc<dyn Gateway>,
}

impl ConversationSync {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// One page of users currently available to message, deduplicated.
    pub async fn fetch_active_users(&self, user_id: i64, page: u32, limit: u32) -> ListOutcome {
        self.listing(
            "active users",
            self.gateway.fetch_active_users(user_id, page, limit),
        )
        .await
    }

    /// One page of existing conversations, deduplicated.
    pub async fn fetch_conversations(&self, user_id: i64, page: u32, limit: u32) -> ListOutcome {
        self.listing(
            "conversations",
            self.gateway.fetch_conversations(user_id, page, limit),
        )
        .await
    }

    /// Full message history with one partner, oldest first.
    ///
    /// Unlike the listings, failure propagates: a chat screen rendering
    /// empty history as if it were legitimate would mislead the user.
    pub async fn fetch_messages(
        &self,
        user_id: i64,
        other_id: i64,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        self.gateway.fetch_messages(user_id, other_id).await
    }

    /// Post a new message. Failure propagates; retrying is the caller's
    /// decision, never this component's.
    pub async fn send_message(&self, request: &SendMessage) -> Result<ChatMessage, ApiError> {
        self.gateway.send_message(request).await
    }

    /// Total unread messages across the conversation list. Resolves 0 on
    /// any failure.
    pub async fn fetch_unread_count(&self, user_id: i64) -> u32 {
        match self
            .fetch_conversations(user_id, 1, UNREAD_SCAN_LIMIT)
            .await
        {
            ListOutcome::Loaded { participants, .. } => total_unread(&participants),
            ListOutcome::Unavailable { .. } => 0,
        }
    }

    /// Case-insensitive name search over the active-user list.
    ///
    /// A query that trims to empty short-circuits without a network call.
    pub async fn search_users(&self, user_id: i64, query: &str) -> Vec<Participant> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let outcome = self.fetch_active_users(user_id, 1, SEARCH_SCAN_LIMIT).await;
        outcome
            .participants()
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Mark every message from `other_id` as read. Fire-and-forget.
    pub async fn mark_as_read(&self, user_id: i64, other_id: i64) {
        if let Err(e) = self.gateway.mark_as_read(user_id, other_id).await {
            tracing::warn!("Failed to mark conversation {other_id} as read: {e}");
        }
    }

    /// Bulk-update delivery statuses. Fire-and-forget; a 404 means the
    /// backend deployment predates the endpoint and is not an error worth
    /// surfacing.
    pub async fn update_message_statuses(
        &self,
        user_id: i64,
        other_id: i64,
        status: campus_types::MessageStatus,
    ) {
        match self
            .gateway
            .update_message_statuses(user_id, other_id, status)
            .await
        {
            Ok(()) => {}
            Err(ApiError::NotFound { path }) => {
                tracing::debug!("Status endpoint absent on this backend ({path}); skipping");
            }
            Err(e) => {
                tracing::warn!("Failed to update message statuses: {e}");
            }
        }
    }

    async fn listing(&self, what: &str, fut: GatewayFuture<'_, ParticipantPage>) -> ListOutcome {
        match fut.await {
            Ok(page) => ListOutcome::Loaded {
                participants: dedup_participants(page.users),
                has_more: page.has_more,
            },
            Err(reason) => {
                tracing::warn!(gateway = self.gateway.name(), "Failed to fetch {what}: {reason}");
                ListOutcome::Unavailable { reason }
            }
        }
    }
}
