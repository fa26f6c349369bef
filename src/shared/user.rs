//! User-facing account types
//!
//! `UserProfile` is the only user shape that ever crosses the wire. Password
//! hashes stay in `backend::auth::users::User`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::validation::{Validate, Validator};

/// Capability level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ssr", derive(sqlx::Type))]
#[cfg_attr(feature = "ssr", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Body of `POST /api/users` (administrative account creation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), SharedError> {
        Validator::new()
            .email("email", &self.email)
            .password("password", &self.password)
            .name("name", &self.name)
            .finish()
    }
}

/// Body of `PUT /api/users/{id}`. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), SharedError> {
        let mut validator = Validator::new();
        if let Some(email) = &self.email {
            validator.email("email", email);
        }
        if let Some(name) = &self.name {
            validator.name("name", name);
        }
        if let Some(password) = &self.password {
            validator.password("password", password);
        }
        validator.finish()
    }
}
