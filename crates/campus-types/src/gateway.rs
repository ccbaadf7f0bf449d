//! Gateway trait for the campus REST backend.

use crate::{ApiError, ChatMessage, MessageStatus, ParticipantPage, SendMessage, UserRecord};
use std::future::Future;
use std::pin::Pin;

/// A boxed future returned by gateway methods.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The remote backend as the core consumes it.
///
/// Dyn-compatible so `SessionStore` and `ConversationSync` work with
/// `Arc<dyn Gateway>`; tests substitute canned implementations.
pub trait Gateway: Send + Sync {
    /// Authenticate and return the candidate user record.
    fn login<'a>(
        &'a self,
        student_id: &'a str,
        password: &'a str,
    ) -> GatewayFuture<'a, UserRecord>;

    /// Fetch the current record for an already-known user id.
    fn fetch_user(&self, id: i64) -> GatewayFuture<'_, UserRecord>;

    /// Change the account password. Success carries no payload.
    fn change_password<'a>(
        &'a self,
        user_id: i64,
        current: &'a str,
        next: &'a str,
    ) -> GatewayFuture<'a, ()>;

    /// One page of users currently available to message.
    fn fetch_active_users(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> GatewayFuture<'_, ParticipantPage>;

    /// One page of existing conversations, most recent first.
    fn fetch_conversations(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> GatewayFuture<'_, ParticipantPage>;

    /// Full message history between two users, oldest first.
    fn fetch_messages(&self, user_id: i64, other_id: i64) -> GatewayFuture<'_, Vec<ChatMessage>>;

    /// Post a new message and return the stored row.
    fn send_message<'a>(&'a self, request: &'a SendMessage) -> GatewayFuture<'a, ChatMessage>;

    /// Mark every message from `other_id` as read.
    fn mark_as_read(&self, user_id: i64, other_id: i64) -> GatewayFuture<'_, ()>;

    /// Bulk-update delivery statuses. Optional endpoint: not every backend
    /// deployment has it, in which case it answers 404.
    fn update_message_statuses(
        &self,
        user_id: i64,
        other_id: i64,
        status: MessageStatus,
    ) -> GatewayFuture<'_, ()>;

    /// Gateway name for logging/display (e.g. "rest").
    fn name(&self) -> &str;
}
