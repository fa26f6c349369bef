/**
 * Operational Endpoints
 *
 * - `GET /api` - API info and endpoint listing
 * - `GET /api/health` - liveness
 * - `GET /api/db-test` - database round trip
 * - `GET /api/socket-status` - live socket connections (admin only)
 * - fallback - JSON 404 for unknown routes
 */

use axum::{extract::State, response::Json};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::backend::error::BackendError;
use crate::backend::middleware::AdminUser;
use crate::backend::realtime::ConnectionRegistry;

pub async fn api_info() -> Json<Value> {
    Json(json!({
        "message": "TaskHub API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "dbTest": "/api/db-test",
            "auth": "/api/auth",
            "tasks": "/api/tasks",
            "users": "/api/users",
            "socketStatus": "/api/socket-status",
            "socket": "/socket",
        }
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn db_test(State(pool): State<SqlitePool>) -> Result<Json<Value>, BackendError> {
    let timestamp: String = sqlx::query_scalar("SELECT CURRENT_TIMESTAMP")
        .fetch_one(&pool)
        .await
        .map_err(|e| BackendError::internal_with("Database connection failed", e))?;

    Ok(Json(json!({
        "message": "Database connection successful",
        "timestamp": timestamp,
    })))
}

pub async fn socket_status(
    State(registry): State<ConnectionRegistry>,
    AdminUser(_admin): AdminUser,
) -> Json<Value> {
    let connected_users = registry.connected_users();
    Json(json!({
        "connectionCount": connected_users.len(),
        "connectedUsers": connected_users,
        "status": "active",
    }))
}

pub async fn not_found() -> BackendError {
    BackendError::not_found("Route not found")
}
