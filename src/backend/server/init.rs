/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including database connection, migrations, state creation and route
 * configuration.
 *
 * # Initialization Process
 *
 * 1. Connect to SQLite (creating the file if needed, foreign keys on)
 * 2. Run the embedded migrations
 * 3. Promote existing accounts listed in `ADMIN_EMAILS`
 * 4. Create `AppState` (token keys, connection registry, fanout)
 * 5. Create and configure the router
 */

use std::str::FromStr;

use axum::Router;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::backend::auth::users::promote_admins;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{ConfigError, ServerConfig};
use crate::backend::server::state::AppState;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Open the pool for `database_url` and bring the schema up to date
pub async fn connect_database(database_url: &str) -> Result<SqlitePool, StartupError> {
    tracing::info!("Connecting to database...");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database ready");

    Ok(pool)
}

/// Fresh, migrated in-memory database on a single connection
///
/// The pool never recycles its connection, since each new in-memory
/// connection would be an empty database.
pub async fn connect_in_memory() -> Result<SqlitePool, StartupError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}

/// Create and configure the Axum application
///
/// Returns the router together with the state it was built on, so callers
/// (the binary, integration tests) can reach the pool and the registry.
pub async fn create_app(config: ServerConfig) -> Result<(Router, AppState), StartupError> {
    tracing::info!("Initializing TaskHub backend server");

    let db_pool = connect_database(&config.database_url).await?;
    let promoted = promote_admins(&db_pool, &config.admin_emails).await?;
    if promoted > 0 {
        tracing::info!("Promoted {} existing account(s) to admin", promoted);
    }
    let app_state = AppState::new(db_pool, config);
    let app = create_router(app_state.clone());

    tracing::info!("Router configured");

    Ok((app, app_state))
}
