//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/disciplines", get(handlers::disciplines::get_disciplines))
        .route("/api/pages", get(handlers::pages::get_default_page))
        .route(
            "/api/pages/{discipline}",
            get(handlers::pages::get_discipline_page),
        )
        .route(
            "/api/pages/{discipline}/{language}",
            get(handlers::pages::get_language_page),
        )
        .route(
            "/api/pages/{discipline}/{language}/{node}",
            get(handlers::pages::get_node_page),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}
