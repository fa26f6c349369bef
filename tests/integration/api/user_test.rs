//! User management API integration tests

use axum::http::StatusCode;
use serde_json::json;
use taskhub::backend::realtime::registry::connection_channel;
use taskhub::shared::event::{personal_room, ServerMessage};
use taskhub::shared::user::Role;

use crate::common::*;

#[tokio::test]
async fn any_user_can_list_and_read_profiles() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;
    let bob = create_test_user(&state, "bob@example.com", "Bob").await;

    let (status, list) = get(&app, "/api/users", Some(&alice.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert!(list[0].get("password_hash").is_none());

    let (status, profile) = get(&app, &format!("/api/users/{}", bob.id()), Some(&alice.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "bob@example.com");
}

#[tokio::test]
async fn unknown_user_is_404() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;

    assert_error(
        &get(&app, "/api/users/4242", Some(&alice.token)).await,
        StatusCode::NOT_FOUND,
        "User not found",
    );
    assert_error(
        &get(&app, "/api/users/4242/tasks", Some(&alice.token)).await,
        StatusCode::NOT_FOUND,
        "User not found",
    );
    assert_error(
        &get(&app, "/api/users/x", Some(&alice.token)).await,
        StatusCode::BAD_REQUEST,
        "Invalid user ID",
    );
}

#[tokio::test]
async fn user_tasks_only_lists_that_owner() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;
    let bob = create_test_user(&state, "bob@example.com", "Bob").await;
    post(&app, "/api/tasks", Some(&alice.token), json!({"title": "alice's"})).await;
    post(&app, "/api/tasks", Some(&bob.token), json!({"title": "bob's"})).await;

    let (status, tasks) = get(&app, &format!("/api/users/{}/tasks", bob.id()), Some(&alice.token)).await;

    assert_eq!(status, StatusCode::OK);
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "bob's");
}

#[tokio::test]
async fn members_cannot_manage_users() {
    let (app, state) = test_app().await;
    let alice = create_test_user(&state, "alice@example.com", "Alice").await;
    let bob = create_test_user(&state, "bob@example.com", "Bob").await;
    let uri = format!("/api/users/{}", bob.id());

    let created = post(
        &app,
        "/api/users",
        Some(&alice.token),
        json!({"email": "new@example.com", "password": "secret1", "name": "New"}),
    )
    .await;
    let updated = put(&app, &uri, Some(&alice.token), json!({"name": "Robert"})).await;
    let deleted = delete(&app, &uri, Some(&alice.token)).await;

    for response in [created, updated, deleted] {
        assert_error(&response, StatusCode::FORBIDDEN, "Admin privileges required");
    }
}

#[tokio::test]
async fn admin_creates_and_updates_users() {
    let (app, state) = test_app().await;
    let admin = create_test_admin(&state, "root@example.com", "Root").await;

    let (status, created) = post(
        &app,
        "/api/users",
        Some(&admin.token),
        json!({"email": "dana@example.com", "password": "secret1", "name": "Dana", "role": "admin"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "admin");

    let uri = format!("/api/users/{}", created["id"]);
    let (status, updated) = put(&app, &uri, Some(&admin.token), json!({"name": "Dana S."})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Dana S.");
    assert_eq!(updated["email"], "dana@example.com");

    let (status, _) = post(
        &app,
        "/api/auth/login",
        None,
        json!({"email": "dana@example.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_create_with_taken_email_conflicts() {
    let (app, state) = test_app().await;
    let admin = create_test_admin(&state, "root@example.com", "Root").await;

    let response = post(
        &app,
        "/api/users",
        Some(&admin.token),
        json!({"email": "root@example.com", "password": "secret1", "name": "Dup"}),
    )
    .await;

    assert_eq!(response.0, StatusCode::CONFLICT);
}

#[tokio::test]
async fn deleting_a_user_cascades_and_closes_their_socket() {
    let (app, state) = test_app().await;
    let admin = create_test_admin(&state, "root@example.com", "Root").await;
    let bob = create_test_user(&state, "bob@example.com", "Bob").await;
    post(&app, "/api/tasks", Some(&bob.token), json!({"title": "orphan?"})).await;

    let (sender, mut inbox) = connection_channel();
    state.registry.register(bob.user.profile(), sender);
    assert!(state.registry.is_connected(bob.id()));

    let (status, body) = delete(&app, &format!("/api/users/{}", bob.id()), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    assert!(!state.registry.is_connected(bob.id()));
    assert!(matches!(inbox.recv().await, Some(ServerMessage::AccountDeleted { .. })));
    assert!(inbox.recv().await.is_none());

    let (_, tasks) = get(&app, "/api/tasks", Some(&admin.token)).await;
    assert_eq!(tasks, json!([]));
    assert_error(
        &get(&app, "/api/auth/verify", Some(&bob.token)).await,
        StatusCode::UNAUTHORIZED,
        "User not found",
    );
}

#[tokio::test]
async fn demoted_admin_stops_receiving_admin_events() {
    let (app, state) = test_app().await;
    let root = create_test_admin(&state, "root@example.com", "Root").await;
    let dana = create_test_admin(&state, "dana@example.com", "Dana").await;

    let (sender, mut inbox) = connection_channel();
    let registration = state.registry.register(dana.user.profile(), sender);
    state
        .registry
        .join_room(dana.id(), registration.connection_id, personal_room(dana.id()));

    let (status, updated) = put(
        &app,
        &format!("/api/users/{}", dana.id()),
        Some(&root.token),
        json!({"role": "member"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "member");

    match inbox.try_recv() {
        Ok(ServerMessage::AccountUpdated { user }) => assert_eq!(user.role, Role::Member),
        other => panic!("expected account_updated, got {other:?}"),
    }

    let (status, _) = post(&app, "/api/tasks", Some(&root.token), json!({"title": "After demotion"})).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut names = Vec::new();
    while let Ok(message) = inbox.try_recv() {
        names.push(message.name());
    }
    assert_eq!(names, vec!["task_created"]);
}

#[tokio::test]
async fn promoted_member_starts_receiving_admin_events() {
    let (app, state) = test_app().await;
    let root = create_test_admin(&state, "root@example.com", "Root").await;
    let bob = create_test_user(&state, "bob@example.com", "Bob").await;

    let (sender, mut inbox) = connection_channel();
    state.registry.register(bob.user.profile(), sender);

    let uri = format!("/api/users/{}", bob.id());
    let (status, _) = put(&app, &uri, Some(&root.token), json!({"role": "admin"})).await;
    assert_eq!(status, StatusCode::OK);

    post(&app, "/api/tasks", Some(&root.token), json!({"title": "After promotion"})).await;

    let mut names = Vec::new();
    while let Ok(message) = inbox.try_recv() {
        names.push(message.name());
    }
    assert_eq!(names, vec!["task_created", "task_created_admin"]);
}
