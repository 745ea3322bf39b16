//! Disciplines API endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use lore_site::{Discipline, Navigator};
use serde::Serialize;

use crate::error::ServerError;
use crate::handlers::{json_response, navigate};
use crate::state::AppState;

/// Response for GET /api/disciplines.
#[derive(Serialize)]
pub(crate) struct DisciplinesResponse {
    /// Disciplines sorted by order.
    items: Vec<Discipline>,
}

/// Handle GET /api/disciplines.
pub(crate) async fn get_disciplines(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let items = navigate(&state, Navigator::disciplines).await?;
    json_response(&state, &headers, &DisciplinesResponse { items })
}
