//! HTTP request handlers.

pub(crate) mod disciplines;
pub(crate) mod pages;

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use lore_site::{NavigationError, Navigator};
use md5::{Digest, Md5};
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Run a navigator call on the blocking pool.
///
/// Navigator calls perform synchronous repository I/O.
pub(crate) async fn navigate<T, F>(state: &AppState, call: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce(&Navigator) -> Result<T, NavigationError> + Send + 'static,
{
    let navigator = Arc::clone(&state.navigator);
    let value = tokio::task::spawn_blocking(move || call(&navigator)).await??;
    Ok(value)
}

/// Serialize `value` as JSON with an `ETag`, honouring `If-None-Match`.
pub(crate) fn json_response<T: Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    value: &T,
) -> Result<Response, ServerError> {
    let body = serde_json::to_string(value)?;
    let etag = compute_etag(&state.version, &body);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_owned()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "private, max-age=60".to_owned()),
        ],
        body,
    )
        .into_response())
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars) - sufficient for
/// cache invalidation with negligible collision probability.
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
