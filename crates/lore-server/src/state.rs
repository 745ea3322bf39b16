//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use lore_site::Navigator;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Page view assembly over the content repository.
    pub(crate) navigator: Arc<Navigator>,
    /// Application version for cache invalidation.
    pub(crate) version: String,
}
