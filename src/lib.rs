//! TaskHub - Main Library
//!
//! TaskHub is a multi-user task manager: a JSON HTTP API for accounts and
//! tasks, plus a WebSocket channel that tells every connected user when a
//! task is created, updated or deleted.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between server and client
//!   - Task and user records, request payloads, validation
//!   - Socket wire messages (`ServerMessage`, `ClientMessage`)
//!   - Client configuration and shared error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server over SQLite
//!   - JWT authentication and bcrypt password hashing
//!   - Connection registry and task event fan-out
//!
//! - **`client`** - Client-side code (only compiled with `client` feature)
//!   - REST client for the API
//!   - Socket bridge with a listener registry
//!   - `TaskBoard`, a local task list kept current from socket events
//!
//! # Feature Flags
//!
//! - **`ssr`** - Backend modules and the `taskhub-server` binary
//! - **`client`** - HTTP and WebSocket client
//!
//! Both are enabled by default.
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation and serialization
//! - `backend::BackendError` for HTTP handlers
//! - `client::ClientError` for the client

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// API and socket client
#[cfg(feature = "client")]
pub mod client;
