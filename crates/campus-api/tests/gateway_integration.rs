//! Integration tests for `ApiClient` against a canned-response HTTP server.
//!
//! Uses a raw TCP test server to simulate backend answers (success
//! envelopes, 404s, 500s) and verify retry behavior, envelope handling,
//! and timeout classification.
//!
//! Run with: `cargo test -p campus-api --test gateway_integration -- --ignored`

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use campus_api::{ApiClient, RetryConfig};
use campus_types::{ApiError, SendMessage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Wrap a JSON body in a minimal HTTP/1.1 response.
fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        status_line,
        body.len(),
        body
    )
}

/// Spawn a server that answers each connection with the next canned
/// response, repeating the last one when the script runs out. Returns the
/// base URL and a counter of connections served.
async fn spawn_server(responses: Vec<String>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_server = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let n = hits_server.fetch_add(1, Ordering::SeqCst);
            let response = responses
                .get(n)
                .or_else(|| responses.last())
                .cloned()
                .unwrap_or_default();

            // Drain the request head before answering
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}"), hits)
}

fn fast_retries() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        initial_delay_ms: 10,
        max_delay_ms: 50,
        backoff_factor: 2.0,
    }
}

#[tokio::test]
#[ignore]
async fn active_users_normalizes_wire_booleans() {
    let body = r#"{
        "success": true,
        "users": [
            {"id": 1, "name": "John", "is_online": "1", "unread_count": "2", "unique_key": "student_1"},
            {"id": 2, "name": "Ana", "is_online": 0, "unique_key": "student_2"}
        ],
        "has_more": false
    }"#;
    let (base, _) = spawn_server(vec![http_response("200 OK", body)]).await;

    let client = ApiClient::new(base).unwrap();
    let page = client.fetch_active_users(7, 1, 20).await.unwrap();

    assert_eq!(page.users.len(), 2);
    assert!(page.users[0].is_online);
    assert_eq!(page.users[0].unread_count, 2);
    assert!(!page.users[1].is_online);
    assert!(!page.has_more);
}

#[tokio::test]
#[ignore]
async fn reads_retry_on_server_error_then_succeed() {
    let ok_body = r#"{"success": true, "users": [], "has_more": false}"#;
    let (base, hits) = spawn_server(vec![
        http_response("500 Internal Server Error", r#"{"error":"transient"}"#),
        http_response("200 OK", ok_body),
    ])
    .await;

    let client = ApiClient::new(base)
        .unwrap()
        .with_retry_config(fast_retries());
    let page = client.fetch_conversations(7, 1, 20).await.unwrap();

    assert!(page.users.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 2, "one retry expected");
}

#[tokio::test]
#[ignore]
async fn reads_give_up_after_max_retries() {
    let (base, hits) = spawn_server(vec![http_response(
        "500 Internal Server Error",
        r#"{"error":"still down"}"#,
    )])
    .await;

    let client = ApiClient::new(base)
        .unwrap()
        .with_retry_config(fast_retries());
    let err = client.fetch_messages(7, 9).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 3, "initial try + 2 retries");
}

#[tokio::test]
#[ignore]
async fn backend_error_envelope_is_not_retried() {
    let (base, hits) = spawn_server(vec![http_response(
        "200 OK",
        r#"{"success": false, "message": "user not enrolled"}"#,
    )])
    .await;

    let client = ApiClient::new(base)
        .unwrap()
        .with_retry_config(fast_retries());
    let err = client.fetch_active_users(7, 1, 20).await.unwrap_err();

    match err {
        ApiError::Backend { message } => assert_eq!(message, "user not enrolled"),
        other => panic!("expected Backend, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1, "backend failures are answers");
}

#[tokio::test]
#[ignore]
async fn status_update_404_maps_to_not_found() {
    let (base, _) = spawn_server(vec![http_response("404 Not Found", "Not Found")]).await;

    let client = ApiClient::new(base).unwrap();
    let err = client
        .update_message_statuses(7, 9, campus_types::MessageStatus::Delivered)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
#[ignore]
async fn send_message_is_never_retried() {
    let (base, hits) = spawn_server(vec![http_response(
        "500 Internal Server Error",
        r#"{"error":"boom"}"#,
    )])
    .await;

    let client = ApiClient::new(base)
        .unwrap()
        .with_retry_config(fast_retries());
    let request = SendMessage {
        sender_id: 7,
        receiver_id: 9,
        message: "hello".to_string(),
    };
    let err = client.send_message(&request).await.unwrap_err();

    assert!(matches!(err, ApiError::Server { .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 1, "send must not repeat");
}

#[tokio::test]
#[ignore]
async fn send_message_without_payload_is_malformed() {
    let (base, _) = spawn_server(vec![http_response("200 OK", r#"{"success": true}"#)]).await;

    let client = ApiClient::new(base).unwrap();
    let request = SendMessage {
        sender_id: 7,
        receiver_id: 9,
        message: "hello".to_string(),
    };
    let err = client.send_message(&request).await.unwrap_err();

    assert!(matches!(err, ApiError::Malformed { .. }));
}

#[tokio::test]
#[ignore]
async fn read_timeout_classified_as_timeout() {
    // A listener that accepts but never answers
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            // Hold the connection open without responding
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(socket);
            });
        }
    });

    let client = ApiClient::with_timeouts(
        format!("http://{addr}"),
        Duration::from_millis(100),
        Duration::from_millis(100),
    )
    .unwrap()
    .with_retry_config(RetryConfig {
        max_retries: 0,
        ..RetryConfig::default()
    });

    let err = client.fetch_user(7).await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
}
