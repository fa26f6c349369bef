/**
 * User Management Handlers
 *
 * `/api/users` routes. Reading is open to any authenticated user; creating,
 * changing and deleting accounts needs the admin role (`AdminUser`).
 *
 * Responses only ever contain `UserProfile`, never the password hash.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use sqlx::SqlitePool;

use crate::backend::auth::password::hash_password;
use crate::backend::auth::users::{self, UserChanges};
use crate::backend::error::BackendError;
use crate::backend::middleware::{AdminUser, ValidJson};
use crate::backend::server::AppState;
use crate::backend::tasks::db as task_db;
use crate::shared::auth::MessageResponse;
use crate::shared::event::{personal_room, ServerMessage};
use crate::shared::task::Task;
use crate::shared::user::{CreateUserRequest, UpdateUserRequest, UserProfile};
use crate::shared::validation::parse_id;

fn user_id(raw: &str) -> Result<i64, BackendError> {
    parse_id(raw).ok_or_else(|| BackendError::validation("Invalid user ID"))
}

fn user_not_found() -> BackendError {
    BackendError::not_found("User not found")
}

pub async fn list_users(State(pool): State<SqlitePool>) -> Result<Json<Vec<UserProfile>>, BackendError> {
    let users = users::list_users(&pool).await?;
    Ok(Json(users.iter().map(|u| u.profile()).collect()))
}

pub async fn get_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, BackendError> {
    let id = user_id(&id)?;
    let user = users::get_user_by_id(&pool, id)
        .await?
        .ok_or_else(user_not_found)?;
    Ok(Json(user.profile()))
}

pub async fn list_user_tasks(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Task>>, BackendError> {
    let id = user_id(&id)?;
    if users::get_user_by_id(&pool, id).await?.is_none() {
        return Err(user_not_found());
    }
    let tasks = task_db::list_tasks_for_user(&pool, id).await?;
    Ok(Json(tasks))
}

pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidJson(request): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>), BackendError> {
    let password_hash = hash_password(request.password, state.config.bcrypt_cost).await?;

    let user = users::create_user(
        &state.db_pool,
        &request.email,
        request.name.trim(),
        &password_hash,
        request.role,
    )
    .await?;

    tracing::info!("Admin {} created user {} ({:?})", admin.id, user.id, user.role);

    Ok((StatusCode::CREATED, Json(user.profile())))
}

pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<UpdateUserRequest>,
) -> Result<Json<UserProfile>, BackendError> {
    let id = user_id(&id)?;

    let password_hash = match request.password {
        Some(password) => Some(hash_password(password, state.config.bcrypt_cost).await?),
        None => None,
    };

    let changes = UserChanges {
        email: request.email,
        name: request.name.map(|name| name.trim().to_string()),
        password_hash,
        role: request.role,
    };

    let user = users::update_user(&state.db_pool, id, changes)
        .await?
        .ok_or_else(user_not_found)?;

    let profile = user.profile();
    if state.registry.update_profile(profile.clone()) {
        state.registry.send_to_room(
            &personal_room(profile.id),
            &ServerMessage::AccountUpdated {
                user: profile.clone(),
            },
        );
        tracing::info!("[Realtime] Refreshed live session of user {}", profile.id);
    }
    tracing::info!("Admin {} updated user {}", admin.id, user.id);

    Ok(Json(profile))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, BackendError> {
    let id = user_id(&id)?;

    if !users::delete_user(&state.db_pool, id).await? {
        return Err(user_not_found());
    }

    state.registry.send_to_user(
        id,
        &ServerMessage::AccountDeleted {
            message: "Your account has been deleted".to_string(),
        },
    );
    if state.registry.evict(id) {
        tracing::info!("[Realtime] Closed live connection of deleted user {}", id);
    }
    tracing::info!("Admin {} deleted user {}", admin.id, id);

    Ok(Json(MessageResponse::new("User deleted successfully")))
}
