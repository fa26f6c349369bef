/**
 * User Model and Database Operations
 *
 * This module handles user data and database operations.
 */

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::shared::user::{Role, UserProfile};

/// User struct representing a user in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,
    /// User email address (unique)
    pub email: String,
    /// Display name
    pub name: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    pub role: Role,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Public view, without the password hash
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Column changes for `update_user`; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

/// Create a new user
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    name: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, sqlx::Error> {
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, name, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, email, name, password_hash, role, created_at, updated_at
        "#,
    )
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Get user by email
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, password_hash, role, created_at, updated_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Get user by ID
pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, password_hash, role, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// All users, newest first
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, password_hash, role, created_at, updated_at
        FROM users
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Partial update. Returns `None` when no user has this id.
pub async fn update_user(
    pool: &SqlitePool,
    id: i64,
    changes: UserChanges,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET email = COALESCE(?, email),
            name = COALESCE(?, name),
            password_hash = COALESCE(?, password_hash),
            role = COALESCE(?, role),
            updated_at = ?
        WHERE id = ?
        RETURNING id, email, name, password_hash, role, created_at, updated_at
        "#,
    )
    .bind(changes.email)
    .bind(changes.name)
    .bind(changes.password_hash)
    .bind(changes.role)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Give the admin role to every existing account whose email is listed
/// (case-insensitive). Returns how many accounts changed.
pub async fn promote_admins(pool: &SqlitePool, emails: &[String]) -> Result<u64, sqlx::Error> {
    let mut promoted = 0;
    for email in emails {
        let result = sqlx::query(
            "UPDATE users SET role = ?, updated_at = ? WHERE lower(email) = lower(?) AND role <> ?",
        )
        .bind(Role::Admin)
        .bind(Utc::now())
        .bind(email)
        .bind(Role::Admin)
        .execute(pool)
        .await?;
        promoted += result.rows_affected();
    }
    Ok(promoted)
}

/// Delete a user (and, through the foreign key, their tasks).
/// Returns whether a row was removed.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
