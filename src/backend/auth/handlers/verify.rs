//! `GET /api/auth/verify`: echoes the caller's profile if the token is good.
//! Rejections happen in `auth_middleware` before this runs.

use axum::response::Json;

use crate::backend::middleware::AuthUser;
use crate::shared::auth::VerifyResponse;

pub async fn verify(AuthUser(user): AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        message: "Token is valid".to_string(),
        user: user.profile(),
    })
}
