//! JSON envelope handling for the PHP backend.
//!
//! Every endpoint answers an object carrying `success` and/or `error`
//! plus a payload field (`user`, `users`, `messages`, `message`). The
//! helpers here enforce that contract: a truthy `error` or a falsy
//! `success` is `ApiError::Backend`, a missing payload is
//! `ApiError::Malformed`.

use campus_types::{ApiError, ChatMessage, Participant, ParticipantPage, UserRecord, truthy};
use serde_json::Value;

/// Render a backend error value (string, object, whatever) as a message.
fn render_error(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Check the response envelope, turning backend-flagged failures into errors.
pub fn ensure_ok(value: &Value) -> Result<(), ApiError> {
    if let Some(error) = value.get("error") {
        if truthy(error) {
            return Err(ApiError::Backend {
                message: render_error(error),
            });
        }
    }
    if let Some(success) = value.get("success") {
        if !truthy(success) {
            let message = value
                .get("message")
                .map(render_error)
                .unwrap_or_else(|| "request failed".to_string());
            return Err(ApiError::Backend { message });
        }
    }
    Ok(())
}

/// Parse a `{success, user: {...}}` response.
pub fn parse_user(value: &Value) -> Result<UserRecord, ApiError> {
    ensure_ok(value)?;
    let payload = value.get("user").ok_or_else(|| ApiError::Malformed {
        message: "missing user payload".to_string(),
    })?;
    serde_json::from_value(payload.clone()).map_err(|e| ApiError::Malformed {
        message: format!("invalid user payload: {e}"),
    })
}

/// Parse a `{success, users: [...], has_more?}` listing page.
///
/// When the backend omits `has_more`, a full page is assumed to have more.
pub fn parse_user_page(value: &Value, limit: u32) -> Result<ParticipantPage, ApiError> {
    ensure_ok(value)?;
    let users = value.get("users").ok_or_else(|| ApiError::Malformed {
        message: "missing users array".to_string(),
    })?;
    let users: Vec<Participant> =
        serde_json::from_value(users.clone()).map_err(|e| ApiError::Malformed {
            message: format!("invalid users array: {e}"),
        })?;
    let has_more = match value.get("has_more") {
        Some(flag) => truthy(flag),
        None => limit > 0 && users.len() as u32 >= limit,
    };
    Ok(ParticipantPage { users, has_more })
}

/// Parse a `{success, messages: [...]}` history response.
pub fn parse_messages(value: &Value) -> Result<Vec<ChatMessage>, ApiError> {
    ensure_ok(value)?;
    let messages = value.get("messages").ok_or_else(|| ApiError::Malformed {
        message: "missing messages array".to_string(),
    })?;
    serde_json::from_value(messages.clone()).map_err(|e| ApiError::Malformed {
        message: format!("invalid messages array: {e}"),
    })
}

/// Parse the `{success, message: {...}}` answer to a send.
///
/// `success` alone is not enough: without the stored row the caller cannot
/// render the message it just sent, so a missing payload is an error even
/// on a nominally successful response.
pub fn parse_sent_message(value: &Value) -> Result<ChatMessage, ApiError> {
    ensure_ok(value)?;
    match value.get("success") {
        Some(flag) if truthy(flag) => {}
        _ => {
            return Err(ApiError::Malformed {
                message: "missing success flag".to_string(),
            });
        }
    }
    let payload = match value.get("message") {
        Some(payload @ Value::Object(_)) => payload,
        _ => {
            return Err(ApiError::Malformed {
                message: "missing message payload".to_string(),
            });
        }
    };
    serde_json::from_value(payload.clone()).map_err(|e| ApiError::Malformed {
        message: format!("invalid message payload: {e}"),
    })
}

/// Parse a bare acknowledgement (`mark_as_read`, status updates).
pub fn parse_ack(value: &Value) -> Result<(), ApiError> {
    ensure_ok(value)
}
