/**
 * Backend Error Types
 *
 * This module defines the single error type every HTTP handler returns.
 * Each variant maps to exactly one status code and carries the message that
 * ends up in the `{ "error": ... }` response envelope.
 *
 * # Status Mapping
 *
 * | Variant          | Status |
 * |------------------|--------|
 * | `Validation`     | 400    |
 * | `Unauthenticated`| 401    |
 * | `InvalidToken`   | 403    |
 * | `Forbidden`      | 403    |
 * | `NotFound`       | 404    |
 * | `Conflict`       | 409    |
 * | `Referential`    | 400    |
 * | `Internal`       | 500    |
 *
 * Ownership mismatches on tasks are reported as `NotFound`, so a caller can
 * never tell "not yours" apart from "does not exist".
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::error::FieldError;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request body, path or query failed validation
    #[error("{message}")]
    Validation {
        message: String,
        /// Per-field failures, empty when the problem is not tied to a field
        details: Vec<FieldError>,
    },

    /// No usable credential, unknown account or bad login
    #[error("{0}")]
    Unauthenticated(String),

    /// Credential present but its signature, expiry or claims are bad
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Authenticated, but lacking the required capability
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Unique constraint violated
    #[error("{0}")]
    Conflict(String),

    /// Foreign key constraint violated
    #[error("{0}")]
    Referential(String),

    /// Anything the client cannot fix
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl BackendError {
    /// Generic validation failure without field details
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Internal error that keeps its cause for logging and debug responses
    pub fn internal_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::Referential(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidToken | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn details(&self) -> &[FieldError] {
        match self {
            Self::Validation { details, .. } => details,
            _ => &[],
        }
    }
}
