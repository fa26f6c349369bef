//! Middleware Module
//!
//! Request processing that runs before handlers:
//!
//! - **`auth`** - bearer-token middleware plus the `AuthUser` / `AdminUser` extractors
//! - **`json`** - `ValidJson`, a validating JSON body extractor
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::middleware;
//! use taskhub::backend::middleware::auth_middleware;
//!
//! let protected = Router::new()
//!     .route("/tasks", get(list_tasks))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
//! ```

pub mod auth;
pub mod json;

pub use auth::{auth_middleware, AdminUser, AuthUser, AuthenticatedUser};
pub use json::ValidJson;
