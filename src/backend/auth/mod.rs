//! Authentication Module
//!
//! This module handles user accounts, password hashing, bearer tokens and the
//! identity check shared by the REST middleware and the socket handshake.
//!
//! # Architecture
//!
//! - **`users`** - User data model and database operations
//! - **`sessions`** - JWT token generation and validation
//! - **`password`** - bcrypt hashing on the blocking pool
//! - **`identity`** - bearer credential → stored user
//! - **`handlers`** - HTTP handlers for authentication endpoints
//!
//! # Authentication Flow
//!
//! 1. **Register**: email, password, name → user created → JWT token returned
//! 2. **Login**: email, password → credentials verified → JWT token returned
//! 3. **Verify**: JWT token → token verified → user profile returned
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens are HS256 JWTs; secret and lifetime come from `ServerConfig`
//! - Missing credential or deleted account → 401, bad or expired token → 403

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// Password hashing
pub mod password;

/// Credential → user resolution
pub mod identity;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::{login, register, verify};
pub use identity::{authenticate, IdentityError};
pub use sessions::TokenKeys;
pub use users::User;
