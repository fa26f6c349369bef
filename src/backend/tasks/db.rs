/**
 * Task Store
 *
 * CRUD over the `tasks` table. Every read joins the owner's display name.
 *
 * Ownership is enforced in SQL: `find_owned`, `update_task` and
 * `delete_task` all filter on `id = ? AND user_id = ?`, so a task that
 * belongs to someone else is indistinguishable from one that does not exist.
 */

use chrono::Utc;
use sqlx::SqlitePool;

use crate::shared::task::{NewTask, Task, TaskUpdate};

/// All tasks, newest first
pub async fn list_tasks(pool: &SqlitePool) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT t.id, t.title, t.description, t.category, t.completed, t.user_id,
               u.name AS user_name, t.created_at, t.updated_at
        FROM tasks t
        JOIN users u ON u.id = t.user_id
        ORDER BY t.created_at DESC, t.id DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// One owner's tasks, newest first
pub async fn list_tasks_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT t.id, t.title, t.description, t.category, t.completed, t.user_id,
               u.name AS user_name, t.created_at, t.updated_at
        FROM tasks t
        JOIN users u ON u.id = t.user_id
        WHERE t.user_id = ?
        ORDER BY t.created_at DESC, t.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Task `id` if `requester` owns it
pub async fn find_owned(pool: &SqlitePool, id: i64, requester: i64) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT t.id, t.title, t.description, t.category, t.completed, t.user_id,
               u.name AS user_name, t.created_at, t.updated_at
        FROM tasks t
        JOIN users u ON u.id = t.user_id
        WHERE t.id = ? AND t.user_id = ?
        "#,
    )
    .bind(id)
    .bind(requester)
    .fetch_optional(pool)
    .await
}

pub async fn create_task(pool: &SqlitePool, fields: &NewTask, owner: i64) -> Result<Task, sqlx::Error> {
    let now = Utc::now();

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO tasks (title, description, category, completed, user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(fields.title.trim())
    .bind(&fields.description)
    .bind(&fields.category)
    .bind(fields.completed)
    .bind(owner)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_owned(pool, id, owner).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Partial update; `None` when the task is missing or not owned by `requester`
pub async fn update_task(
    pool: &SqlitePool,
    id: i64,
    fields: &TaskUpdate,
    requester: i64,
) -> Result<Option<Task>, sqlx::Error> {
    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE tasks
        SET title = COALESCE(?, title),
            description = COALESCE(?, description),
            category = COALESCE(?, category),
            completed = COALESCE(?, completed),
            updated_at = ?
        WHERE id = ? AND user_id = ?
        RETURNING id
        "#,
    )
    .bind(fields.title.as_deref().map(str::trim))
    .bind(&fields.description)
    .bind(&fields.category)
    .bind(fields.completed)
    .bind(Utc::now())
    .bind(id)
    .bind(requester)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(id) => find_owned(pool, id, requester).await,
        None => Ok(None),
    }
}

/// Delete and return the removed task; `None` when missing or not owned
pub async fn delete_task(pool: &SqlitePool, id: i64, requester: i64) -> Result<Option<Task>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let task = sqlx::query_as::<_, Task>(
        r#"
        SELECT t.id, t.title, t.description, t.category, t.completed, t.user_id,
               u.name AS user_name, t.created_at, t.updated_at
        FROM tasks t
        JOIN users u ON u.id = t.user_id
        WHERE t.id = ? AND t.user_id = ?
        "#,
    )
    .bind(id)
    .bind(requester)
    .fetch_optional(&mut *tx)
    .await?;

    if task.is_some() {
        sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(requester)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(task)
}
