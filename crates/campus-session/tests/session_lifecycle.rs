//! Integration tests for the session lifecycle over real file storage.
//!
//! Walks the whole arc — login, partial updates, consent, restart,
//! logout — and documents the accepted concurrent-update race.

use std::sync::Arc;

use campus_session::{
    FileStorage, LogNotifier, SessionState, SessionStore, SessionStorage, UserPatch,
};
use campus_types::gateway::{Gateway, GatewayFuture};
use campus_types::{
    ApiError, ChatMessage, MessageStatus, ParticipantPage, SendMessage, UserRecord,
};
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::Notify;

/// Gateway whose `fetch_user` blocks until released, for racing refreshes
/// against local updates.
struct ControlledGateway {
    release: Arc<Notify>,
    payload: UserRecord,
}

impl Gateway for ControlledGateway {
    fn login<'a>(&'a self, _: &'a str, _: &'a str) -> GatewayFuture<'a, UserRecord> {
        unreachable!()
    }

    fn fetch_user(&self, _id: i64) -> GatewayFuture<'_, UserRecord> {
        let release = self.release.clone();
        let payload = self.payload.clone();
        Box::pin(async move {
            release.notified().await;
            Ok(payload)
        })
    }

    fn change_password<'a>(&'a self, _: i64, _: &'a str, _: &'a str) -> GatewayFuture<'a, ()> {
        Box::pin(async { Err(ApiError::Timeout) })
    }

    fn fetch_active_users(&self, _: i64, _: u32, _: u32) -> GatewayFuture<'_, ParticipantPage> {
        unreachable!()
    }

    fn fetch_conversations(&self, _: i64, _: u32, _: u32) -> GatewayFuture<'_, ParticipantPage> {
        unreachable!()
    }

    fn fetch_messages(&self, _: i64, _: i64) -> GatewayFuture<'_, Vec<ChatMessage>> {
        unreachable!()
    }

    fn send_message<'a>(&'a self, _: &'a SendMessage) -> GatewayFuture<'a, ChatMessage> {
        unreachable!()
    }

    fn mark_as_read(&self, _: i64, _: i64) -> GatewayFuture<'_, ()> {
        unreachable!()
    }

    fn update_message_statuses(&self, _: i64, _: i64, _: MessageStatus) -> GatewayFuture<'_, ()> {
        unreachable!()
    }

    fn name(&self) -> &str {
        "controlled"
    }
}

fn idle_gateway() -> ControlledGateway {
    ControlledGateway {
        release: Arc::new(Notify::new()),
        payload: student(),
    }
}

fn student() -> UserRecord {
    serde_json::from_value(json!({
        "id": 42,
        "student_id": "2020-04417",
        "first_name": "Paolo",
        "last_name": "Reyes",
        "email": "paolo.reyes@example.edu",
        "status": "Enrolled",
        "enrollment_status": "Regular",
        "academic_year": "2023-2024",
        "year_level_name": "Second Year",
        "scholarship_pct": 25,
    }))
    .unwrap()
}

fn store_over(dir: &TempDir, gateway: ControlledGateway) -> SessionStore {
    let storage: Arc<dyn SessionStorage> =
        Arc::new(FileStorage::new(dir.path().to_path_buf()));
    SessionStore::new(storage, Arc::new(gateway), Arc::new(LogNotifier))
}

#[tokio::test]
async fn full_lifecycle_survives_restart() {
    let dir = TempDir::new().unwrap();

    // First process: login, edit the profile, accept the policy
    let store = store_over(&dir, idle_gateway());
    store.load_initial().await;
    store.login(student()).await.unwrap();
    store
        .update_user(UserPatch {
            contact_number: Some("0917-555-0134".to_string()),
            ..UserPatch::default()
        })
        .await;
    store.update_policy_status(true).await;
    let committed = store.current_user().unwrap();

    // Second process: restore from the same directory
    let restarted = store_over(&dir, idle_gateway());
    restarted.load_initial().await;

    let restored = restarted.current_user().unwrap();
    assert_eq!(restored, committed);
    assert_eq!(restored.contact_number.as_deref(), Some("0917-555-0134"));
    assert_eq!(restored.policy_accepted, 1);
    assert_eq!(restored.extra["scholarship_pct"], json!(25));

    // Third process after logout: nothing to restore
    restarted.logout().await;
    let third = store_over(&dir, idle_gateway());
    third.load_initial().await;
    assert_eq!(third.state(), SessionState::LoggedOut);
}

#[tokio::test]
async fn clear_user_then_restart_restores_cached_record() {
    let dir = TempDir::new().unwrap();

    let store = store_over(&dir, idle_gateway());
    store.load_initial().await;
    store.login(student()).await.unwrap();
    store.clear_user();
    assert_eq!(store.state(), SessionState::LoggedOut);

    // clear_user left the persisted record behind
    let restarted = store_over(&dir, idle_gateway());
    restarted.load_initial().await;
    assert!(restarted.state().is_logged_in());
}

/// Documents the accepted lost-update race: a local update landing while a
/// refresh is in flight is overwritten when the refresh commits. This is
/// last-write-wins by design, not a safety guarantee.
#[tokio::test]
async fn refresh_in_flight_overwrites_concurrent_update() {
    let dir = TempDir::new().unwrap();
    let release = Arc::new(Notify::new());

    let mut server_copy = student();
    server_copy.status = "Enrolled (verified)".to_string();
    let gateway = ControlledGateway {
        release: release.clone(),
        payload: server_copy,
    };

    let store = Arc::new(store_over(&dir, gateway));
    store.load_initial().await;
    store.login(student()).await.unwrap();

    // Start a refresh that parks inside the gateway call
    let refresh_store = store.clone();
    let refresh = tokio::spawn(async move { refresh_store.refresh_user().await });
    tokio::task::yield_now().await;

    // A local update lands while the refresh is suspended
    store
        .update_user(UserPatch {
            contact_number: Some("0917-555-0199".to_string()),
            ..UserPatch::default()
        })
        .await;
    assert_eq!(
        store.current_user().unwrap().contact_number.as_deref(),
        Some("0917-555-0199")
    );

    // Let the refresh finish; its server payload wins wholesale
    release.notify_one();
    assert!(refresh.await.unwrap());

    let after = store.current_user().unwrap();
    assert_eq!(after.status, "Enrolled (verified)");
    assert_ne!(
        after.contact_number.as_deref(),
        Some("0917-555-0199"),
        "the concurrent update is lost — known last-write-wins race"
    );
}
