//! Real-time socket integration tests
//!
//! Each test serves the app on an ephemeral port and connects real
//! `EventBridge` clients, so the handshake, registry, fan-out and client
//! dispatch are exercised end to end.

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::Value;
use taskhub::client::bridge::{CONNECT_ERROR_EVENT, DISCONNECT_EVENT};
use taskhub::client::{ApiClient, ClientConfig, EventBridge, TaskBoard};
use taskhub::shared::config::AppConfig;
use taskhub::shared::task::{NewTask, TaskUpdate};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::common::*;

const WAIT: Duration = Duration::from_secs(5);

const WATCHED: [&str; 14] = [
    "connected",
    "task_created",
    "task_updated",
    "task_deleted",
    "task_created_admin",
    "task_updated_admin",
    "task_deleted_admin",
    "pong",
    "room_joined",
    "room_left",
    "session_superseded",
    "account_updated",
    "account_deleted",
    "error",
];

fn client_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::with_builder(AppConfig::builder().server_url(format!("http://{addr}"))).unwrap()
}

/// A bridge whose events (plus `disconnect`) are funneled into one channel.
fn watched_bridge(addr: SocketAddr) -> (EventBridge, mpsc::UnboundedReceiver<(String, Value)>) {
    let bridge = EventBridge::new(&client_config(addr));
    let (tx, rx) = mpsc::unbounded_channel();
    for event in WATCHED.into_iter().chain([DISCONNECT_EVENT]) {
        let tx = tx.clone();
        bridge.on(event, move |data| {
            let _ = tx.send((event.to_string(), data.clone()));
        });
    }
    (bridge, rx)
}

/// Wait for `name`, skipping anything else. Panics after `WAIT`.
async fn next_named(rx: &mut mpsc::UnboundedReceiver<(String, Value)>, name: &str) -> Value {
    timeout(WAIT, async {
        loop {
            let (event, data) = rx.recv().await.expect("bridge channel open");
            if event == name {
                return data;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {name}"))
}

/// Assert nothing called `name` shows up within a short window.
async fn assert_silent(rx: &mut mpsc::UnboundedReceiver<(String, Value)>, name: &str) {
    let result = timeout(Duration::from_millis(300), async {
        loop {
            match rx.recv().await {
                Some((event, _)) if event == name => return,
                Some(_) => continue,
                None => std::future::pending::<()>().await,
            }
        }
    })
    .await;
    assert!(result.is_err(), "unexpected {name} event");
}

#[tokio::test]
async fn created_task_reaches_other_connected_user() {
    let (addr, state) = spawn_server().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;
    let bob = create_test_user(&state, "bob@example.com", "Bob").await;

    let (mut bob_bridge, mut bob_events) = watched_bridge(addr);
    bob_bridge.connect(&bob.token).await.unwrap();
    let hello = next_named(&mut bob_events, "connected").await;
    assert_eq!(hello["user"]["email"], "bob@example.com");

    let mut api = ApiClient::new(client_config(addr));
    api.set_token(Some(alice.token.clone()));
    let created = api.create_task(&NewTask::titled("Buy milk")).await.unwrap();

    let event = next_named(&mut bob_events, "task_created").await;
    assert_eq!(event["task"]["id"], created.id);
    assert_eq!(event["task"]["title"], "Buy milk");
    assert_eq!(event["task"]["completed"], false);
    assert_eq!(event["actorName"], "Alice");

    let mut board = TaskBoard::new();
    assert!(board.apply_envelope("task_created", &event).unwrap());
    assert_eq!(board.get(created.id).unwrap().title, "Buy milk");

    assert_silent(&mut bob_events, "task_created_admin").await;
    bob_bridge.disconnect().await;
}

#[tokio::test]
async fn every_connection_gets_the_broadcast_and_only_admins_the_admin_event() {
    let (addr, state) = spawn_server().await;
    let author = create_test_user(&state, "a@example.com", "Author").await;
    let member = create_test_user(&state, "b@example.com", "Member").await;
    let admin = create_test_admin(&state, "c@example.com", "Admin").await;

    let (mut author_bridge, mut author_events) = watched_bridge(addr);
    let (mut member_bridge, mut member_events) = watched_bridge(addr);
    let (mut admin_bridge, mut admin_events) = watched_bridge(addr);
    author_bridge.connect(&author.token).await.unwrap();
    member_bridge.connect(&member.token).await.unwrap();
    admin_bridge.connect(&admin.token).await.unwrap();
    for rx in [&mut author_events, &mut member_events, &mut admin_events] {
        next_named(rx, "connected").await;
    }

    let mut api = ApiClient::new(client_config(addr));
    api.set_token(Some(author.token.clone()));
    let task = api.create_task(&NewTask::titled("Ship it")).await.unwrap();
    api.update_task(task.id, &TaskUpdate::completed(true)).await.unwrap();

    for rx in [&mut author_events, &mut member_events, &mut admin_events] {
        let created = next_named(rx, "task_created").await;
        assert_eq!(created["task"]["id"], task.id);
        let updated = next_named(rx, "task_updated").await;
        assert_eq!(updated["task"]["completed"], true);
    }

    let admin_event = next_named(&mut admin_events, "task_created_admin").await;
    assert_eq!(admin_event["actorId"], author.id());
    assert_eq!(admin_event["actorEmail"], "a@example.com");
    assert_eq!(admin_event["connectionCount"], 3);

    assert_silent(&mut member_events, "task_created_admin").await;

    for bridge in [&mut author_bridge, &mut member_bridge, &mut admin_bridge] {
        bridge.disconnect().await;
    }
}

#[tokio::test]
async fn handshake_with_bad_token_is_refused() {
    let (addr, state) = spawn_server().await;

    let mut bridge = EventBridge::new(&client_config(addr));
    let (tx, mut rx) = mpsc::unbounded_channel();
    bridge.on(CONNECT_ERROR_EVENT, move |data| {
        let _ = tx.send(data.clone());
    });

    let err = bridge.connect("not-a-token").await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(!bridge.is_connected());
    let reported = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(reported["status"], 403);
    assert_eq!(state.registry.connection_count(), 0);
}

#[tokio::test]
async fn expired_token_handshake_is_refused() {
    let (addr, state) = spawn_server().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;
    let stale = state
        .tokens
        .create_token_at(
            alice.id(),
            &alice.user.email,
            chrono::Utc::now() - chrono::Duration::hours(48),
        )
        .unwrap();

    let mut bridge = EventBridge::new(&client_config(addr));
    let err = bridge.connect(&stale).await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(!bridge.is_connected());
    assert_eq!(state.registry.connection_count(), 0);

    bridge.connect(&alice.token).await.unwrap();
    assert!(bridge.is_connected());
    bridge.disconnect().await;
}

#[tokio::test]
async fn deleted_account_is_told_before_the_socket_closes() {
    let (addr, state) = spawn_server().await;
    let root = create_test_admin(&state, "root@example.com", "Root").await;
    let bob = create_test_user(&state, "bob@example.com", "Bob").await;

    let (mut bridge, mut events) = watched_bridge(addr);
    bridge.connect(&bob.token).await.unwrap();
    next_named(&mut events, "connected").await;

    let client = reqwest::Client::new();
    let response = client
        .put(format!("http://{addr}/api/users/{}", bob.id()))
        .bearer_auth(&root.token)
        .json(&serde_json::json!({"name": "Robert"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let updated = next_named(&mut events, "account_updated").await;
    assert_eq!(updated["user"]["name"], "Robert");

    let response = client
        .delete(format!("http://{addr}/api/users/{}", bob.id()))
        .bearer_auth(&root.token)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let notice = next_named(&mut events, "account_deleted").await;
    assert!(notice["message"].is_string());
    next_named(&mut events, DISCONNECT_EVENT).await;
    assert!(!bridge.is_connected());
}

#[tokio::test]
async fn second_connection_supersedes_the_first() {
    let (addr, state) = spawn_server().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;

    let (mut first, mut first_events) = watched_bridge(addr);
    first.connect(&alice.token).await.unwrap();
    next_named(&mut first_events, "connected").await;

    let (mut second, mut second_events) = watched_bridge(addr);
    second.connect(&alice.token).await.unwrap();
    next_named(&mut second_events, "connected").await;

    let notice = next_named(&mut first_events, "session_superseded").await;
    assert!(notice["message"].is_string());
    next_named(&mut first_events, DISCONNECT_EVENT).await;
    assert!(!first.is_connected());

    assert_eq!(state.registry.connection_count(), 1);
    assert!(second.is_connected());
    second.disconnect().await;
}

#[tokio::test]
async fn ping_and_rooms_round_trip() {
    let (addr, state) = spawn_server().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;

    let (mut bridge, mut events) = watched_bridge(addr);
    bridge.connect(&alice.token).await.unwrap();
    next_named(&mut events, "connected").await;

    bridge.ping().unwrap();
    let pong = next_named(&mut events, "pong").await;
    assert!(pong["timestamp"].is_string());

    bridge.join_room("ops").unwrap();
    assert_eq!(next_named(&mut events, "room_joined").await["room"], "ops");

    bridge.leave_room("ops").unwrap();
    assert_eq!(next_named(&mut events, "room_left").await["room"], "ops");

    bridge.join_room("  ").unwrap();
    assert_eq!(next_named(&mut events, "error").await["message"], "Room name is required");

    bridge.disconnect().await;
    assert!(!bridge.is_connected());
}

#[tokio::test]
async fn disconnect_removes_the_connection() {
    let (addr, state) = spawn_server().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;

    let (mut bridge, mut events) = watched_bridge(addr);
    bridge.connect(&alice.token).await.unwrap();
    next_named(&mut events, "connected").await;
    assert!(state.registry.is_connected(alice.id()));

    bridge.disconnect().await;

    timeout(WAIT, async {
        while state.registry.is_connected(alice.id()) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("server should drop the connection");
}

#[tokio::test]
async fn buy_milk_walkthrough() {
    let (addr, state) = spawn_server().await;
    let bob = create_test_user(&state, "bob@example.com", "Bob").await;

    let mut api = ApiClient::new(client_config(addr));
    let registered = api
        .register("alice@example.com", "secret1", "Alice")
        .await
        .unwrap();
    assert_eq!(registered.user.name, "Alice");
    api.logout();
    api.login("alice@example.com", "secret1").await.unwrap();
    assert_eq!(api.verify().await.unwrap().user.email, "alice@example.com");

    let (mut bob_bridge, mut bob_events) = watched_bridge(addr);
    bob_bridge.connect(&bob.token).await.unwrap();
    next_named(&mut bob_events, "connected").await;

    let created = api
        .create_task(&NewTask::titled("Buy milk").with_category("shopping"))
        .await
        .unwrap();
    assert!(!created.completed);
    assert_eq!(created.category.as_deref(), Some("shopping"));

    let event = next_named(&mut bob_events, "task_created").await;
    assert_eq!(event["actorName"], "Alice");
    assert_eq!(event["task"]["title"], "Buy milk");

    let done = api
        .update_task(created.id, &TaskUpdate::completed(true))
        .await
        .unwrap();
    assert!(done.completed);
    assert_eq!(done.title, "Buy milk");

    let unchanged = api.update_task(created.id, &TaskUpdate::default()).await.unwrap();
    assert_eq!(unchanged.title, "Buy milk");
    assert!(unchanged.completed);

    let deleted = api.delete_task(created.id).await.unwrap();
    assert_eq!(deleted.message, "Task deleted successfully");
    next_named(&mut bob_events, "task_deleted").await;

    let err = api.get_task(created.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "API error 404: Task not found");

    bob_bridge.disconnect().await;
}
