/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - the SQLite connection pool
 * - the token signing keys
 * - the connection registry of live sockets
 * - the event fanout that turns task mutations into socket events
 * - the resolved server configuration
 *
 * # Thread Safety
 *
 * Every field is cheap to clone and shares its inner data:
 * - `SqlitePool` is reference counted internally
 * - `ConnectionRegistry` wraps `Arc<Mutex<HashMap<..>>>`
 * - `ServerConfig` sits behind an `Arc`
 *
 * Tests build as many independent `AppState`s as they need; nothing here is
 * process-global.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::auth::sessions::TokenKeys;
use crate::backend::realtime::{ConnectionRegistry, EventFanout};
use crate::backend::server::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db_pool: SqlitePool,

    /// JWT signing and verification keys
    pub tokens: TokenKeys,

    /// Live socket connections, one per user
    pub registry: ConnectionRegistry,

    /// Task event delivery over `registry`
    pub fanout: EventFanout,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, config: ServerConfig) -> Self {
        let registry = ConnectionRegistry::new();
        Self {
            db_pool,
            tokens: TokenKeys::new(&config.jwt_secret, config.jwt_expiry_hours),
            fanout: EventFanout::new(registry.clone()),
            registry,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for ConnectionRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.registry.clone()
    }
}

impl FromRef<AppState> for EventFanout {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.fanout.clone()
    }
}
