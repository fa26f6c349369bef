//! Backend Module
//!
//! This module contains all server-side code for TaskHub: an Axum HTTP API
//! over SQLite plus a WebSocket channel that pushes task changes to every
//! connected user.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, startup, application state
//! - **`routes`** - HTTP route table and router assembly
//! - **`auth`** - Password hashing, JWT tokens, user store, auth handlers
//! - **`middleware`** - Bearer authentication and validated JSON bodies
//! - **`tasks`** - Task persistence and `/api/tasks` handlers
//! - **`users`** - `/api/users` management handlers
//! - **`realtime`** - Connection registry, event fan-out, socket endpoint
//! - **`error`** - `BackendError` and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - `taskhub-server` binary
//! ├── server/         - Config, init, state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Request extractors and layers
//! ├── tasks/          - Task store and handlers
//! ├── users/          - User management handlers
//! ├── realtime/       - Socket registry and fan-out
//! └── error/          - Error types
//! ```
//!
//! # Write Path
//!
//! A successful task mutation is committed first and only then handed to
//! `EventFanout::publish`, which broadcasts `task_created` / `task_updated` /
//! `task_deleted` to every connection and the `*_admin` variant to admins.
//! Delivery is best effort; a slow or gone socket never fails the request.
//!
//! # Example
//!
//! ```rust,no_run
//! use taskhub::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::load()?;
//! let (router, _state) = create_app(config).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Real-time socket system
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication and user store
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Task store and handlers
pub mod tasks;

/// User management handlers
pub mod users;

pub use error::BackendError;
pub use realtime::{ConnectionRegistry, EventFanout};
pub use server::{create_app, AppState, ServerConfig};
