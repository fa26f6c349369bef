//! Request and response bodies of the `/api/auth` routes.

use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::user::UserProfile;
use crate::shared::validation::{Validate, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), SharedError> {
        Validator::new()
            .email("email", &self.email)
            .password("password", &self.password)
            .name("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), SharedError> {
        Validator::new()
            .email("email", &self.email)
            .password("password", &self.password)
            .finish()
    }
}

/// Returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserProfile,
    pub token: String,
}

/// Returned by `GET /api/auth/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Plain `{message}` acknowledgement used by delete routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{error}` envelope of every failed API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
