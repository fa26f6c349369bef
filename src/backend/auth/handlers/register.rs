/**
 * Register Handler
 *
 * `POST /api/auth/register`
 *
 * # Registration Process
 *
 * 1. Validate email format, password length and name (via `ValidJson`)
 * 2. Check if the email is already registered
 * 3. Hash password using bcrypt (cost from configuration)
 * 4. Create user in database with the `member` role, or `admin` when the
 *    email is listed in `ADMIN_EMAILS`
 * 5. Generate JWT token
 * 6. Return token and public profile
 *
 * # Errors
 *
 * * `400 Bad Request` - Malformed body or failed validation
 * * `409 Conflict` - Email already registered (checked up front, and again by
 *   the unique index if two registrations race)
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::password::hash_password;
use crate::backend::auth::users::{create_user, get_user_by_email};
use crate::backend::error::BackendError;
use crate::backend::middleware::ValidJson;
use crate::backend::server::AppState;
use crate::shared::auth::{AuthResponse, RegisterRequest};
use crate::shared::user::Role;

pub async fn register(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), BackendError> {
    tracing::info!("Register request for email: {}", request.email);

    if get_user_by_email(&state.db_pool, &request.email).await?.is_some() {
        tracing::warn!("Email already registered: {}", request.email);
        return Err(BackendError::conflict("User with this email already exists"));
    }

    let password_hash = hash_password(request.password, state.config.bcrypt_cost).await?;

    let role = if state.config.is_admin_email(&request.email) {
        tracing::info!("Registering {} as admin (listed in ADMIN_EMAILS)", request.email);
        Role::Admin
    } else {
        Role::Member
    };

    let user = create_user(
        &state.db_pool,
        &request.email,
        request.name.trim(),
        &password_hash,
        role,
    )
    .await?;

    let token = state.tokens.create_token(user.id, &user.email)?;

    tracing::info!("User registered: {} ({})", user.name, user.email);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: user.profile(),
            token,
        }),
    ))
}
