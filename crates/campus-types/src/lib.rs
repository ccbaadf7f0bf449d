//! Shared types and error hierarchy for Campus.

pub mod chat;
pub mod error;
pub mod gateway;
pub mod user;
pub mod util;

pub use chat::{ChatMessage, MessageStatus, Participant, ParticipantPage, SendMessage};
pub use error::{ApiError, CampusError, ConfigError};
pub use user::UserRecord;
pub use util::{truncate_str, truthy};
