//! Navigation error types.

use lore_content::RepositoryError;

use crate::model::ModelError;

/// Error assembling a page view.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// Slug lookup matched nothing.
    #[error("{kind} not found: {slug}")]
    NotFound { kind: &'static str, slug: String },
    /// Repository holds no disciplines, so there is no default.
    #[error("No disciplines available")]
    NoDisciplines,
    /// Discipline links no languages, so there is no default.
    #[error("Discipline '{discipline}' has no languages")]
    NoLanguages { discipline: String },
    /// Declared root node is missing from the node collection.
    #[error("Root node '{root}' of discipline '{discipline}' not found")]
    RootNotFound { discipline: String, root: String },
    /// No piece exists for the (language, node) pair.
    #[error("No piece for language '{language}' and node '{node}'")]
    PieceNotFound { language: String, node: String },
    /// Repository query failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// Repository returned an entry of the wrong shape.
    #[error("Invalid content: {0}")]
    Model(#[from] ModelError),
    /// I/O thread pool could not be started.
    #[error("Failed to create I/O thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl NavigationError {
    /// Check if the error means a requested page does not exist.
    ///
    /// Other errors indicate broken content or an unreachable backend.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::PieceNotFound { .. })
    }
}
