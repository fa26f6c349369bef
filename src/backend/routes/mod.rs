//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs            - Module exports and documentation
//! ├── router.rs         - Main router creation, CORS, tracing, fallback
//! ├── api_routes.rs     - `/api` route table and auth layering
//! └── system_routes.rs  - info, health, db-test, socket-status, 404
//! ```
//!
//! # Route Types
//!
//! ## Real-time
//!
//! - `GET /socket` - WebSocket upgrade (token in query or header)
//!
//! ## API
//!
//! - `POST /api/auth/register`, `POST /api/auth/login`, `GET /api/auth/verify`
//! - `/api/tasks` CRUD (owner-only mutation)
//! - `/api/users` management (admin-only mutation)
//! - `GET /api/health`, `GET /api/db-test`, `GET /api`, `GET /api/socket-status`
//!
//! Anything else answers `404 {"error":"Route not found"}`.

/// Main router creation
pub mod router;

/// API route table
pub mod api_routes;

/// Operational endpoints
pub mod system_routes;

pub use router::create_router;
