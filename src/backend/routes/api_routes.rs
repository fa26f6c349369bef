/**
 * API Route Handlers
 *
 * This module wires every `/api` endpoint onto the router.
 *
 * # Routes
 *
 * ## Public
 * - `GET /api`, `GET /api/health`, `GET /api/db-test`
 * - `POST /api/auth/register`, `POST /api/auth/login`
 *
 * ## Authenticated (bearer token, `auth_middleware`)
 * - `GET /api/auth/verify`
 * - `GET|POST /api/tasks`, `GET|PUT|DELETE /api/tasks/{id}`
 * - `GET|POST /api/users`, `GET|PUT|DELETE /api/users/{id}`, `GET /api/users/{id}/tasks`
 * - `GET /api/socket-status`
 *
 * Admin-only handlers check the role themselves through `AdminUser`.
 */

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::backend::auth::{login, register, verify};
use crate::backend::middleware::auth_middleware;
use crate::backend::routes::system_routes::{api_info, db_test, health, socket_status};
use crate::backend::server::state::AppState;
use crate::backend::tasks::{create_task, delete_task, get_task, list_tasks, update_task};
use crate::backend::users::{
    create_user, delete_user, get_user, list_user_tasks, list_users, update_user,
};

/// Add the public and protected API routes to `router`
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api", get(api_info))
        .route("/api/health", get(health))
        .route("/api/db-test", get(db_test))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login));

    let protected = Router::new()
        .route("/api/auth/verify", get(verify))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/users/{id}/tasks", get(list_user_tasks))
        .route("/api/socket-status", get(socket_status))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    router.merge(public).merge(protected)
}
