//! Conversation-list synchronization and reconciliation for Campus.

pub mod reconcile;
pub mod sync;

pub use reconcile::{dedup_participants, total_unread};
pub use sync::{ConversationSync, ListOutcome};
