/**
 * Task Handlers
 *
 * REST handlers for `/api/tasks`. All routes sit behind `auth_middleware`.
 *
 * | Route                     | Handler       | Notes                          |
 * |---------------------------|---------------|--------------------------------|
 * | `GET /api/tasks`          | `list_tasks`  | every user's tasks, newest first |
 * | `GET /api/tasks/{id}`     | `get_task`    | owner only, else 404           |
 * | `POST /api/tasks`         | `create_task` | 201, emits `task_created`      |
 * | `PUT /api/tasks/{id}`     | `update_task` | owner only, emits `task_updated` |
 * | `DELETE /api/tasks/{id}`  | `delete_task` | owner only, emits `task_deleted` |
 *
 * Events are published after the store call succeeds and before the
 * response is returned. Publishing cannot fail the request.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use sqlx::SqlitePool;

use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, ValidJson};
use crate::backend::server::AppState;
use crate::backend::tasks::db;
use crate::shared::auth::MessageResponse;
use crate::shared::event::TaskEventKind;
use crate::shared::task::{NewTask, Task, TaskUpdate};
use crate::shared::validation::parse_id;

fn task_id(raw: &str) -> Result<i64, BackendError> {
    parse_id(raw).ok_or_else(|| BackendError::validation("Invalid task ID"))
}

fn task_not_found() -> BackendError {
    BackendError::not_found("Task not found")
}

pub async fn list_tasks(State(pool): State<SqlitePool>) -> Result<Json<Vec<Task>>, BackendError> {
    let tasks = db::list_tasks(&pool).await?;
    Ok(Json(tasks))
}

pub async fn get_task(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Task>, BackendError> {
    let id = task_id(&id)?;
    let task = db::find_owned(&pool, id, user.id)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(Json(task))
}

pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(fields): ValidJson<NewTask>,
) -> Result<(StatusCode, Json<Task>), BackendError> {
    let task = db::create_task(&state.db_pool, &fields, user.id).await?;

    tracing::info!("Task {} created by user {}", task.id, user.id);
    state.fanout.publish(TaskEventKind::Created, &task, &user.profile());

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ValidJson(fields): ValidJson<TaskUpdate>,
) -> Result<Json<Task>, BackendError> {
    let id = task_id(&id)?;
    let task = db::update_task(&state.db_pool, id, &fields, user.id)
        .await?
        .ok_or_else(task_not_found)?;

    tracing::info!("Task {} updated by user {}", task.id, user.id);
    state.fanout.publish(TaskEventKind::Updated, &task, &user.profile());

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, BackendError> {
    let id = task_id(&id)?;
    let task = db::delete_task(&state.db_pool, id, user.id)
        .await?
        .ok_or_else(task_not_found)?;

    tracing::info!("Task {} deleted by user {}", task.id, user.id);
    state.fanout.publish(TaskEventKind::Deleted, &task, &user.profile());

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}
