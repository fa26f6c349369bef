//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the client and the server: the task and user records, the request and
//! response bodies of the REST API, and the frames of the real-time channel.
//!
//! # Overview
//!
//! Nothing in here touches the network or the database. Everything is plain
//! serde data plus the validation rules both sides agree on.

/// Task records and task request bodies
pub mod task;

/// User profile and administrative request bodies
pub mod user;

/// Auth request/response bodies
pub mod auth;

/// Real-time event frames
pub mod event;

/// Shared error types
pub mod error;

/// Request shape validation
pub mod validation;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use error::{FieldError, SharedError};
pub use event::{ClientMessage, EventEnvelope, ServerMessage, TaskEventKind};
pub use task::{NewTask, Task, TaskUpdate};
pub use user::{Role, UserProfile};
pub use validation::Validate;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
