//! Task API integration tests
//!
//! CRUD through the router, ownership rules, and the events each successful
//! mutation hands to the connection registry.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use taskhub::backend::realtime::registry::connection_channel;
use taskhub::shared::event::{ServerMessage, TaskEventKind};

use crate::common::*;

#[tokio::test]
async fn create_then_fetch_own_task() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;

    let (status, created) = post(
        &app,
        "/api/tasks",
        Some(&alice.token),
        json!({"title": "Buy milk", "category": "errands"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["category"], "errands");
    assert_eq!(created["completed"], false);
    assert_eq!(created["user_id"], alice.id());
    assert_eq!(created["user_name"], "Alice");

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = get(&app, &format!("/api/tasks/{id}"), Some(&alice.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn list_is_newest_first_across_users() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;
    let bob = create_test_user(&state, "bob@example.com", "Bob").await;

    for (user, title) in [(&alice, "first"), (&bob, "second"), (&alice, "third")] {
        let (status, _) = post(&app, "/api/tasks", Some(&user.token), json!({"title": title})).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = get(&app, "/api/tasks", Some(&bob.token)).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;

    let (status, body) = post(&app, "/api/tasks", Some(&alice.token), json!({"title": "   "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "title");
    assert_eq!(body["details"][0]["message"], "Title is required");
}

#[tokio::test]
async fn padded_title_is_measured_after_trimming() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;
    let full = "x".repeat(255);

    let (status, created) = post(
        &app,
        "/api/tasks",
        Some(&alice.token),
        json!({"title": format!("  {full}  ")}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], full.as_str());

    let (status, body) = post(
        &app,
        "/api/tasks",
        Some(&alice.token),
        json!({"title": format!(" {full}x ")}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["message"], "Title must be at most 255 characters");
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;
    let (_, created) = post(
        &app,
        "/api/tasks",
        Some(&alice.token),
        json!({"title": "Write report", "description": "Q3 numbers"}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = put(
        &app,
        &format!("/api/tasks/{id}"),
        Some(&alice.token),
        json!({"completed": true}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "Write report");
    assert_eq!(updated["description"], "Q3 numbers");
}

#[tokio::test]
async fn other_users_tasks_look_missing() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;
    let mallory = create_test_user(&state, "mallory@example.com", "Mallory").await;
    let (_, created) = post(&app, "/api/tasks", Some(&alice.token), json!({"title": "Private"})).await;
    let uri = format!("/api/tasks/{}", created["id"]);

    let read = get(&app, &uri, Some(&mallory.token)).await;
    let update = put(&app, &uri, Some(&mallory.token), json!({"title": "pwned"})).await;
    let remove = delete(&app, &uri, Some(&mallory.token)).await;

    assert_error(&read, StatusCode::NOT_FOUND, "Task not found");
    assert_error(&update, StatusCode::NOT_FOUND, "Task not found");
    assert_error(&remove, StatusCode::NOT_FOUND, "Task not found");

    let (_, still_there) = get(&app, &uri, Some(&alice.token)).await;
    assert_eq!(still_there["title"], "Private");
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;
    let (_, created) = post(&app, "/api/tasks", Some(&alice.token), json!({"title": "Temp"})).await;
    let uri = format!("/api/tasks/{}", created["id"]);

    let (status, body) = delete(&app, &uri, Some(&alice.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");

    assert_error(&get(&app, &uri, Some(&alice.token)).await, StatusCode::NOT_FOUND, "Task not found");
}

#[tokio::test]
async fn malformed_ids_are_rejected() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;

    for raw in ["abc", "0", "-3", "1.5"] {
        let response = get(&app, &format!("/api/tasks/{raw}"), Some(&alice.token)).await;
        assert_error(&response, StatusCode::BAD_REQUEST, "Invalid task ID");
    }
}

#[tokio::test]
async fn mutations_publish_events_to_registered_connections() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;
    let watcher = create_test_admin(&state, "watcher@example.com", "Watcher").await;

    let (sender, mut inbox) = connection_channel();
    state.registry.register(watcher.user.profile(), sender);

    let (_, created) = post(&app, "/api/tasks", Some(&alice.token), json!({"title": "Buy milk"})).await;
    let uri = format!("/api/tasks/{}", created["id"]);
    put(&app, &uri, Some(&alice.token), json!({"completed": true})).await;
    delete(&app, &uri, Some(&alice.token)).await;

    let mut names = Vec::new();
    while let Ok(message) = inbox.try_recv() {
        if let ServerMessage::TaskCreated(payload) = &message {
            assert_eq!(payload.actor_name, "Alice");
            assert_eq!(payload.task.title, "Buy milk");
        }
        names.push(message.name());
    }

    assert_eq!(
        names,
        vec![
            TaskEventKind::Created.event_name(),
            TaskEventKind::Created.admin_event_name(),
            TaskEventKind::Updated.event_name(),
            TaskEventKind::Updated.admin_event_name(),
            TaskEventKind::Deleted.event_name(),
            TaskEventKind::Deleted.admin_event_name(),
        ]
    );
}

#[tokio::test]
async fn failed_mutation_publishes_nothing() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;

    let (sender, mut inbox) = connection_channel();
    state.registry.register(alice.user.profile(), sender);

    put(&app, "/api/tasks/999", Some(&alice.token), json!({"completed": true})).await;
    post(&app, "/api/tasks", Some(&alice.token), json!({"title": ""})).await;

    assert!(inbox.try_recv().is_err());
}
