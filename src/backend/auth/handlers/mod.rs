//! Authentication Handlers Module
//!
//! This module contains all HTTP handlers for authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── register.rs  - User registration handler
//! ├── login.rs     - User authentication handler
//! └── verify.rs    - Token check / current user handler
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register
//! - **`login`** - POST /api/auth/login
//! - **`verify`** - GET /api/auth/verify (behind `auth_middleware`)
//!
//! Request and response bodies live in `shared::auth` so the client crate
//! half uses the exact same types.

/// Register handler
pub mod register;

/// Login handler
pub mod login;

/// Token verification handler
pub mod verify;

pub use login::login;
pub use register::register;
pub use verify::verify;
