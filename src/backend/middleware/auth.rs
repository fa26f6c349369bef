/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. It reads the bearer token from the Authorization
 * header, resolves it to a stored user through the identity verifier and
 * attaches that user to the request extensions for handlers.
 *
 * Handlers then take `AuthUser` (any authenticated caller) or `AdminUser`
 * (callers with the admin role; others get 403).
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::identity::{authenticate, bearer_token};
use crate::backend::auth::users::User;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// User resolved by `auth_middleware`, stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub User);

/// Authentication middleware
///
/// 1. Extracts the token from `Authorization: Bearer <token>` (401 if absent)
/// 2. Verifies signature and expiry (403 if invalid)
/// 3. Loads the user it names (401 if the account is gone)
/// 4. Attaches the user to request extensions
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = bearer_token(header)
        .inspect_err(|_| {
            tracing::warn!(path = %request.uri().path(), "Missing or malformed Authorization header");
        })?
        .to_owned();

    let user = authenticate(&app_state.db_pool, &app_state.tokens, &token).await?;

    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}

fn authenticated_user(parts: &Parts) -> Result<User, BackendError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .map(|authenticated| authenticated.0.clone())
        .ok_or_else(|| {
            tracing::warn!("AuthenticatedUser not found in request extensions");
            BackendError::unauthenticated("Access token required")
        })
}

/// Axum extractor for the authenticated user
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticated_user(parts).map(AuthUser)
    }
}

/// Axum extractor for an authenticated user holding the admin role
#[derive(Clone, Debug)]
pub struct AdminUser(pub User);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated_user(parts)?;
        if !user.is_admin() {
            tracing::warn!("Admin route refused for user {}", user.id);
            return Err(BackendError::forbidden("Admin privileges required"));
        }
        Ok(AdminUser(user))
    }
}
