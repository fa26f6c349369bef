/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Layers (outermost first)
 *
 * 1. CORS, restricted to the configured frontend origin
 * 2. `TraceLayer` request logging
 * 3. Routes: `/socket` plus everything under `/api`
 * 4. JSON 404 fallback
 */

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::realtime::socket_handler;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::system_routes::not_found;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/socket", get(socket_handler));

    let router = configure_api_routes(router, &app_state);

    router
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&app_state.config.frontend_url))
        .with_state(app_state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!("Invalid FRONTEND_URL {:?}, CORS disabled: {}", frontend_url, e);
            layer
        }
    }
}
