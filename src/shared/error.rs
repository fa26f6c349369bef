//! Shared Error Types
//!
//! This module defines error types that are shared between the client and the server.
//! These errors represent failures that both sides can detect on their own, before a
//! request ever reaches the database.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - one or more request fields failed their shape checks
//!
//! # Usage
//!
//! ```rust
//! use taskhub::shared::error::SharedError;
//!
//! let error = SharedError::validation("title", "Title is required");
//! assert_eq!(error.to_string(), "Validation failed: Title is required");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field, as it appears in the JSON body
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Shared error types that can occur on both sides of the wire
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Input validation error; always carries at least one field error
    #[error("Validation failed: {}", summarize(.errors))]
    ValidationError {
        /// Every field that failed, in check order
        errors: Vec<FieldError>,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a validation error for a single field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Field errors carried by this error (empty for serialization errors)
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::ValidationError { errors } => errors,
            Self::SerializationError { .. } => &[],
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
