//! Identity Verifier
//!
//! Resolves a bearer credential to a stored [`User`]. Shared by the REST
//! middleware and the WebSocket handshake so both reject the same way.

use sqlx::SqlitePool;
use thiserror::Error;

use crate::backend::auth::sessions::TokenKeys;
use crate::backend::auth::users::{get_user_by_id, User};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Access token required")]
    MissingCredential,

    #[error("Invalid or expired token")]
    InvalidCredential,

    #[error("User not found")]
    UnknownUser,

    #[error("identity lookup failed: {0}")]
    Store(#[from] sqlx::Error),
}

/// Token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, IdentityError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(IdentityError::MissingCredential)
}

/// Token presented during the socket handshake: bare, or with a `Bearer ` prefix.
pub fn handshake_token(raw: Option<&str>) -> Result<&str, IdentityError> {
    raw.map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
        .filter(|token| !token.is_empty())
        .ok_or(IdentityError::MissingCredential)
}

/// Verify `token` and load the user it names.
pub async fn authenticate(
    pool: &SqlitePool,
    keys: &TokenKeys,
    token: &str,
) -> Result<User, IdentityError> {
    let claims = keys.verify_token(token).map_err(|e| {
        tracing::warn!(error = %e, "Rejected bearer token");
        IdentityError::InvalidCredential
    })?;

    let user_id = claims.user_id().ok_or(IdentityError::InvalidCredential)?;

    get_user_by_id(pool, user_id)
        .await?
        .ok_or(IdentityError::UnknownUser)
}
