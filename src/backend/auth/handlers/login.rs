/**
 * Login Handler
 *
 * `POST /api/auth/login`
 *
 * Unknown email and wrong password produce the same 401 so the endpoint
 * does not reveal which accounts exist.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::password::verify_password;
use crate::backend::auth::users::get_user_by_email;
use crate::backend::error::BackendError;
use crate::backend::middleware::ValidJson;
use crate::backend::server::AppState;
use crate::shared::auth::{AuthResponse, LoginRequest};

pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let invalid = || BackendError::unauthenticated("Invalid credentials");

    let Some(user) = get_user_by_email(&state.db_pool, &request.email).await? else {
        tracing::warn!("Login attempt for unknown email: {}", request.email);
        return Err(invalid());
    };

    if !verify_password(request.password, user.password_hash.clone()).await? {
        tracing::warn!("Invalid password for user: {}", user.email);
        return Err(invalid());
    }

    let token = state.tokens.create_token(user.id, &user.email)?;

    tracing::info!("User logged in: {}", user.email);

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: user.profile(),
        token,
    }))
}
