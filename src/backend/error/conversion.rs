/**
 * Error Conversion
 *
 * `From` impls that fold lower-layer errors into `BackendError`, and the
 * `IntoResponse` impl that renders it.
 *
 * # Response Format
 *
 * ```json
 * { "error": "Validation failed", "details": [{ "field": "title", "message": "Title is required" }] }
 * ```
 *
 * `details` appears only for validation errors that name fields. Debug builds
 * also attach `stack`, the chain of underlying causes of an internal error.
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::backend::auth::identity::IdentityError;
use crate::backend::error::types::BackendError;
use crate::shared::SharedError;

impl From<SharedError> for BackendError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::ValidationError { errors } => BackendError::Validation {
                message: "Validation failed".to_string(),
                details: errors,
            },
            SharedError::SerializationError { .. } => {
                BackendError::internal_with("Something went wrong!", err)
            }
        }
    }
}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return BackendError::conflict("Resource already exists");
            }
            if db_err.is_foreign_key_violation() {
                return BackendError::Referential("Referenced resource does not exist".to_string());
            }
        }
        if let sqlx::Error::RowNotFound = err {
            return BackendError::not_found("Resource not found");
        }
        BackendError::internal_with("Something went wrong!", err)
    }
}

impl From<bcrypt::BcryptError> for BackendError {
    fn from(err: bcrypt::BcryptError) -> Self {
        BackendError::internal_with("Something went wrong!", err)
    }
}

impl From<jsonwebtoken::errors::Error> for BackendError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        BackendError::internal_with("Something went wrong!", err)
    }
}

impl From<tokio::task::JoinError> for BackendError {
    fn from(err: tokio::task::JoinError) -> Self {
        BackendError::internal_with("Something went wrong!", err)
    }
}

impl From<IdentityError> for BackendError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::MissingCredential | IdentityError::UnknownUser => {
                BackendError::unauthenticated(err.to_string())
            }
            IdentityError::InvalidCredential => BackendError::InvalidToken,
            IdentityError::Store(source) => BackendError::internal_with("Something went wrong!", source),
        }
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let mut body = json!({ "error": self.message() });
        if !self.details().is_empty() {
            body["details"] = json!(self.details());
        }
        if cfg!(debug_assertions) {
            if let Some(stack) = error_chain(&self) {
                body["stack"] = Value::from(stack);
            }
        }

        (status, Json(body)).into_response()
    }
}

/// Underlying causes, outermost first.
fn error_chain(err: &BackendError) -> Option<Vec<String>> {
    let mut chain = Vec::new();
    let mut current = std::error::Error::source(err);
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    (!chain.is_empty()).then_some(chain)
}
