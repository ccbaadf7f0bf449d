//! Messaging types: conversation partners and chat messages.
//!
//! Everything here deserializes straight off the backend's JSON, so the
//! loosely-typed wire shapes (numeric/string booleans, MySQL datetimes)
//! are coerced at the serde boundary and never leak past it.

use crate::util::truthy;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A conversation partner in a message listing.
///
/// `unique_key` is the dedup identity: the backend may reuse a numeric `id`
/// across user categories, so listings are deduplicated on this key, first
/// occurrence winning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "de_truthy")]
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp_opt")]
    pub last_message_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_count")]
    pub unread_count: u32,
    pub unique_key: String,
}

/// One page of a participant listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantPage {
    pub users: Vec<Participant>,
    pub has_more: bool,
}

/// Delivery status of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
        }
    }
}

/// A single chat message, timestamp already parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    #[serde(rename = "message")]
    pub body: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "de_truthy")]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
}

/// Request body for sending a new message.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
}

/// Parse a backend timestamp. The backend mixes RFC 3339 and bare MySQL
/// datetimes (assumed UTC) across endpoints.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn de_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(truthy(&value))
}

/// Unread counts arrive as numbers or numeric strings; anything negative or
/// unparseable collapses to 0.
fn de_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let count = match &value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    Ok(u32::try_from(count).unwrap_or(0))
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unparseable timestamp: {raw:?}")))
}

fn de_timestamp_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::String(raw) => Ok(parse_timestamp(&raw)),
        _ => Ok(None),
    }
}
