//! Authentication API integration tests
//!
//! Register, login, verify, and the bearer middleware's failure modes.

use axum::http::StatusCode;
use serde_json::json;
use taskhub::backend::server::config::ServerConfig;

use crate::common::*;

#[tokio::test]
async fn register_returns_profile_and_working_token() {
    let (app, _state) = test_app().await;

    let (status, body) = post(
        &app,
        "/api/auth/register",
        None,
        json!({"email": "alice@example.com", "password": "secret1", "name": "Alice"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "member");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap();
    let (status, verified) = get(&app, "/api/auth/verify", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["message"], "Token is valid");
    assert_eq!(verified["user"]["name"], "Alice");
}

#[tokio::test]
async fn register_with_listed_admin_email_gets_admin_role() {
    let config = ServerConfig {
        admin_emails: vec!["owner@example.com".to_string()],
        ..test_config()
    };
    let (app, _state) = test_app_with(config).await;

    let (status, body) = post(
        &app,
        "/api/auth/register",
        None,
        json!({"email": "Owner@Example.com", "password": "secret1", "name": "Owner"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "admin");

    let token = body["token"].as_str().unwrap().to_string();
    let (status, created) = post(
        &app,
        "/api/users",
        Some(&token),
        json!({"email": "staff@example.com", "password": "secret1", "name": "Staff"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "member");

    let (_, other) = post(
        &app,
        "/api/auth/register",
        None,
        json!({"email": "guest@example.com", "password": "secret1", "name": "Guest"}),
    )
    .await;
    assert_eq!(other["user"]["role"], "member");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let (app, state) = test_app().await;
    create_test_user(&state, "alice@example.com", "Alice").await;

    let response = post(
        &app,
        "/api/auth/register",
        None,
        json!({"email": "alice@example.com", "password": "secret1", "name": "Other"}),
    )
    .await;

    assert_error(&response, StatusCode::CONFLICT, "User with this email already exists");
}

#[tokio::test]
async fn register_validates_every_field() {
    let (app, _state) = test_app().await;

    let (status, body) = post(
        &app,
        "/api/auth/register",
        None,
        json!({"email": "not-an-email", "password": "123", "name": "  "}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password", "name"]);
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let (app, _state) = test_app().await;

    let (status, body) = post(&app, "/api/auth/login", None, json!({"email": 5})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"][0]["field"], "body");
}

#[tokio::test]
async fn login_with_correct_password() {
    let (app, state) = test_app().await;
    create_test_user(&state, "bob@example.com", "Bob").await;

    let (status, body) = post(
        &app,
        "/api/auth/login",
        None,
        json!({"email": "bob@example.com", "password": TEST_PASSWORD}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_part_was_wrong() {
    let (app, state) = test_app().await;
    create_test_user(&state, "bob@example.com", "Bob").await;

    let wrong_password = post(
        &app,
        "/api/auth/login",
        None,
        json!({"email": "bob@example.com", "password": "wrong-password"}),
    )
    .await;
    let unknown_email = post(
        &app,
        "/api/auth/login",
        None,
        json!({"email": "nobody@example.com", "password": TEST_PASSWORD}),
    )
    .await;

    assert_error(&wrong_password, StatusCode::UNAUTHORIZED, "Invalid credentials");
    assert_error(&unknown_email, StatusCode::UNAUTHORIZED, "Invalid credentials");
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let (app, _state) = test_app().await;

    let response = get(&app, "/api/tasks", None).await;

    assert_error(&response, StatusCode::UNAUTHORIZED, "Access token required");
}

#[tokio::test]
async fn protected_route_with_bad_token_is_403() {
    let (app, _state) = test_app().await;

    let response = get(&app, "/api/auth/verify", Some("garbage.token.value")).await;

    assert_error(&response, StatusCode::FORBIDDEN, "Invalid or expired token");
}

#[tokio::test]
async fn token_of_deleted_user_is_rejected() {
    let (app, state) = test_app().await;
    let carol = create_test_user(&state, "carol@example.com", "Carol").await;
    taskhub::backend::auth::users::delete_user(&state.db_pool, carol.id())
        .await
        .unwrap();

    let response = get(&app, "/api/auth/verify", Some(&carol.token)).await;

    assert_error(&response, StatusCode::UNAUTHORIZED, "User not found");
}
