//! Application route configuration.

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{auth_routes, health, main_routes, not_found, user_routes};
use super::middleware::session_middleware;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(main_routes())
        .merge(auth_routes())
        .merge(user_routes())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        // Added after the session layer, so probes never create sessions
        .route("/health", get(health))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
