//! HTTP client for the campus REST backend.

use std::time::Duration;

use campus_types::gateway::{Gateway, GatewayFuture};
use campus_types::{
    ApiError, ChatMessage, MessageStatus, ParticipantPage, SendMessage, UserRecord,
};
use serde_json::Value;

use crate::response;
use crate::retry::{RetryConfig, calculate_delay, is_retryable};

/// Ceiling on how long a read endpoint may take to answer.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Ceiling for the message-send path, which writes a row server-side.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(15);

const LOGIN: &str = "/api/auth/login.php";
const GET_STUDENT: &str = "/api/students/get_student.php";
const CHANGE_PASSWORD: &str = "/api/auth/change_password.php";
const ACTIVE_USERS: &str = "/api/messages/get_active_users.php";
const CONVERSATIONS: &str = "/api/messages/get_conversations.php";
const MESSAGES: &str = "/api/messages/get_messages.php";
const SEND_MESSAGE: &str = "/api/messages/send_message.php";
const MARK_READ: &str = "/api/messages/mark_as_read.php";
const UPDATE_STATUS: &str = "/api/messages/update_status.php";

/// Client for the campus REST backend.
///
/// Reads retry transparently on transient failures; writes never do — a
/// repeated `send_message` would create a duplicate row.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    retry_config: RetryConfig,
    send_timeout: Duration,
}

impl ApiClient {
    /// Create a client with the default timeouts.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeouts(base_url, DEFAULT_READ_TIMEOUT, DEFAULT_SEND_TIMEOUT)
    }

    /// Create a client with explicit read/send timeouts.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        read_timeout: Duration,
        send_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(read_timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry_config: RetryConfig::default(),
            send_timeout,
        })
    }

    /// Set the retry configuration for transient errors on reads.
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Issue a GET and parse the JSON body, retrying transient failures.
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        for attempt in 0..=self.retry_config.max_retries {
            tracing::debug!(
                "GET {url} (attempt {}/{})",
                attempt + 1,
                self.retry_config.max_retries + 1
            );

            let result = self.http.get(&url).query(query).send().await;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp.json::<Value>().await.map_err(|e| ApiError::Malformed {
                            message: format!("invalid JSON body: {e}"),
                        });
                    }

                    let body = resp.text().await.unwrap_or_default();
                    let err = classify_status(status.as_u16(), path, &body);

                    if !is_retryable(&err) || attempt == self.retry_config.max_retries {
                        return Err(err);
                    }

                    let delay = calculate_delay(&self.retry_config, attempt);
                    tracing::warn!(
                        "Retryable error on GET {path} (attempt {}/{}): {err}. Retrying in {delay}ms...",
                        attempt + 1,
                        self.retry_config.max_retries,
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    let err = if e.is_timeout() {
                        ApiError::Timeout
                    } else {
                        ApiError::Network(e.to_string())
                    };

                    if attempt == self.retry_config.max_retries {
                        return Err(err);
                    }

                    let delay = calculate_delay(&self.retry_config, attempt);
                    tracing::warn!(
                        "Retryable network error on GET {path} (attempt {}/{}): {err}. Retrying in {delay}ms...",
                        attempt + 1,
                        self.retry_config.max_retries,
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }

        // Unreachable: the loop always returns on the last attempt
        unreachable!("retry loop should have returned")
    }

    /// Issue a POST with a JSON body. No retries: every POST here has a
    /// server-side effect or carries credentials.
    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {url}");

        let mut request = self.http.post(&url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), path, &body));
        }

        resp.json::<Value>().await.map_err(|e| ApiError::Malformed {
            message: format!("invalid JSON body: {e}"),
        })
    }

    pub async fn login(&self, student_id: &str, password: &str) -> Result<UserRecord, ApiError> {
        let body = serde_json::json!({ "student_id": student_id, "password": password });
        let value = self.post_json(LOGIN, &body, None).await?;
        response::parse_user(&value)
    }

    pub async fn fetch_user(&self, id: i64) -> Result<UserRecord, ApiError> {
        let value = self.get_json(GET_STUDENT, &[("id", id.to_string())]).await?;
        response::parse_user(&value)
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        current: &str,
        next: &str,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "user_id": user_id,
            "current_password": current,
            "new_password": next,
        });
        let value = self.post_json(CHANGE_PASSWORD, &body, None).await?;
        response::parse_ack(&value)
    }

    pub async fn fetch_active_users(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> Result<ParticipantPage, ApiError> {
        let value = self.get_json(ACTIVE_USERS, &page_query(user_id, page, limit)).await?;
        response::parse_user_page(&value, limit)
    }

    pub async fn fetch_conversations(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> Result<ParticipantPage, ApiError> {
        let value = self.get_json(CONVERSATIONS, &page_query(user_id, page, limit)).await?;
        response::parse_user_page(&value, limit)
    }

    pub async fn fetch_messages(
        &self,
        user_id: i64,
        other_id: i64,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let query = [
            ("user_id", user_id.to_string()),
            ("other_id", other_id.to_string()),
        ];
        let value = self.get_json(MESSAGES, &query).await?;
        response::parse_messages(&value)
    }

    pub async fn send_message(&self, request: &SendMessage) -> Result<ChatMessage, ApiError> {
        let value = self
            .post_json(SEND_MESSAGE, request, Some(self.send_timeout))
            .await?;
        response::parse_sent_message(&value)
    }

    pub async fn mark_as_read(&self, user_id: i64, other_id: i64) -> Result<(), ApiError> {
        let body = serde_json::json!({ "user_id": user_id, "other_id": other_id });
        let value = self.post_json(MARK_READ, &body, None).await?;
        response::parse_ack(&value)
    }

    pub async fn update_message_statuses(
        &self,
        user_id: i64,
        other_id: i64,
        status: MessageStatus,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({
            "user_id": user_id,
            "other_id": other_id,
            "status": status.as_str(),
        });
        let value = self.post_json(UPDATE_STATUS, &body, None).await?;
        response::parse_ack(&value)
    }
}

impl Gateway for ApiClient {
    fn login<'a>(
        &'a self,
        student_id: &'a str,
        password: &'a str,
    ) -> GatewayFuture<'a, UserRecord> {
        Box::pin(self.login(student_id, password))
    }

    fn fetch_user(&self, id: i64) -> GatewayFuture<'_, UserRecord> {
        Box::pin(self.fetch_user(id))
    }

    fn change_password<'a>(
        &'a self,
        user_id: i64,
        current: &'a str,
        next: &'a str,
    ) -> GatewayFuture<'a, ()> {
        Box::pin(self.change_password(user_id, current, next))
    }

    fn fetch_active_users(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> GatewayFuture<'_, ParticipantPage> {
        Box::pin(self.fetch_active_users(user_id, page, limit))
    }

    fn fetch_conversations(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> GatewayFuture<'_, ParticipantPage> {
        Box::pin(self.fetch_conversations(user_id, page, limit))
    }

    fn fetch_messages(&self, user_id: i64, other_id: i64) -> GatewayFuture<'_, Vec<ChatMessage>> {
        Box::pin(self.fetch_messages(user_id, other_id))
    }

    fn send_message<'a>(&'a self, request: &'a SendMessage) -> GatewayFuture<'a, ChatMessage> {
        Box::pin(self.send_message(request))
    }

    fn mark_as_read(&self, user_id: i64, other_id: i64) -> GatewayFuture<'_, ()> {
        Box::pin(self.mark_as_read(user_id, other_id))
    }

    fn update_message_statuses(
        &self,
        user_id: i64,
        other_id: i64,
        status: MessageStatus,
    ) -> GatewayFuture<'_, ()> {
        Box::pin(self.update_message_statuses(user_id, other_id, status))
    }

    fn name(&self) -> &str {
        "rest"
    }
}

fn page_query(user_id: i64, page: u32, limit: u32) -> [(&'static str, String); 3] {
    [
        ("user_id", user_id.to_string()),
        ("page", page.to_string()),
        ("limit", limit.to_string()),
    ]
}

/// Classify an HTTP error response into a typed ApiError.
fn classify_status(status: u16, path: &str, body: &str) -> ApiError {
    // Try to pull a message out of a JSON error body
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: Option<Value>,
        message: Option<String>,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| {
            b.message.or_else(|| {
                b.error.map(|e| match e {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
            })
        })
        .unwrap_or_else(|| body.to_string());

    match status {
        404 => ApiError::NotFound {
            path: path.to_string(),
        },
        _ => ApiError::Server { status, message },
    }
}
