//! The authenticated student record.

use crate::util::truthy;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Fallback shown for display fields the backend omitted.
pub const UNSET_FIELD: &str = "N/A";

/// A student account as the backend reports it.
///
/// Core fields are structured; anything else the backend sends rides along
/// verbatim in `extra` and is never inspected, only preserved through
/// updates and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub enrollment_status: String,
    #[serde(default)]
    pub evaluation_status: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    pub policy_accepted: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_level_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_level_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Display name, `"First Last"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the account has been deactivated (case-insensitive match on
    /// `account_status`).
    pub fn is_deactivated(&self) -> bool {
        self.account_status
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("deactivated"))
    }

    /// Whether the one-time policy consent is still outstanding.
    pub fn needs_policy_consent(&self) -> bool {
        self.policy_accepted == 0
    }

    /// Fill every optional display field with a fallback so no reader of a
    /// committed session ever sees an unset value. Login and refresh both
    /// commit through this.
    pub fn normalized(mut self) -> Self {
        self.avatar.get_or_insert_with(String::new);
        self.contact_number
            .get_or_insert_with(|| UNSET_FIELD.to_string());
        self.join_date
            .get_or_insert_with(|| Utc::now().format("%Y-%m-%d").to_string());
        self.year_level_name
            .get_or_insert_with(|| UNSET_FIELD.to_string());
        self.policy_accepted = self.policy_accepted.min(1);
        self
    }
}

/// Deserialize a 0/1 consent flag that may arrive as a number, string, or
/// boolean.
fn de_flag<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(u8::from(truthy(&value)))
}
