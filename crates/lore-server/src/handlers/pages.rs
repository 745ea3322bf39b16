//! Pages API endpoints.
//!
//! Each URL shape selects one navigator entry point; the response is the
//! serialized page view.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;

use crate::error::ServerError;
use crate::handlers::{json_response, navigate};
use crate::state::AppState;

/// Handle GET /api/pages.
pub(crate) async fn get_default_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let view = navigate(&state, |navigator| navigator.default_view()).await?;
    json_response(&state, &headers, &view)
}

/// Handle GET /api/pages/{discipline}.
pub(crate) async fn get_discipline_page(
    Path(discipline): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let view = navigate(&state, move |navigator| {
        navigator.discipline_view(&discipline)
    })
    .await?;
    json_response(&state, &headers, &view)
}

/// Handle GET /api/pages/{discipline}/{language}.
pub(crate) async fn get_language_page(
    Path((discipline, language)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let view = navigate(&state, move |navigator| {
        navigator.language_view(&discipline, &language)
    })
    .await?;
    json_response(&state, &headers, &view)
}

/// Handle GET /api/pages/{discipline}/{language}/{node}.
pub(crate) async fn get_node_page(
    Path((discipline, language, node)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let view = navigate(&state, move |navigator| {
        navigator.node_view(&discipline, &language, &node)
    })
    .await?;
    json_response(&state, &headers, &view)
}
