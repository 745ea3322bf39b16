//! Repository trait and error types.
//!
//! Provides the core [`ContentRepository`] trait for querying content entries,
//! along with [`RepositoryError`] for unified error handling across backends.

use crate::entry::{Entry, Filters};

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum RepositoryErrorKind {
    /// Resource (space, directory, endpoint) does not exist.
    NotFound,
    /// Content could not be decoded.
    InvalidData,
    /// Filter cannot be expressed by the backend.
    InvalidQuery,
    /// Credentials rejected.
    Unauthorized,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Too many requests.
    RateLimited,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance.
#[derive(Debug, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (bad credentials, invalid data, invalid query).
    #[default]
    Permanent,
    /// Retry immediately (timeout, connection reset).
    Temporary,
    /// Retry with backoff (rate limited, service unavailable).
    Persistent,
}

/// Repository error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct RepositoryError {
    /// Semantic error category.
    pub kind: RepositoryErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Content type being queried (if applicable).
    pub content_type: Option<String>,
    /// Backend identifier (e.g., "Fs", "Contentful", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RepositoryError {
    /// Create a new repository error.
    #[must_use]
    pub fn new(kind: RepositoryErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            content_type: None,
            backend: None,
            source: None,
        }
    }

    /// Attach content type context.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Create a repository error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => RepositoryErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => RepositoryErrorKind::Unauthorized,
            std::io::ErrorKind::TimedOut => RepositoryErrorKind::Timeout,
            std::io::ErrorKind::InvalidData => RepositoryErrorKind::InvalidData,
            _ => RepositoryErrorKind::Other,
        };
        let status = match err.kind() {
            std::io::ErrorKind::TimedOut => ErrorStatus::Temporary,
            _ => ErrorStatus::Permanent,
        };
        Self::new(kind).with_status(status).with_source(err)
    }
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (content type: node)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            RepositoryErrorKind::NotFound => "Not found",
            RepositoryErrorKind::InvalidData => "Invalid data",
            RepositoryErrorKind::InvalidQuery => "Invalid query",
            RepositoryErrorKind::Unauthorized => "Unauthorized",
            RepositoryErrorKind::Unavailable => "Unavailable",
            RepositoryErrorKind::RateLimited => "Rate limited",
            RepositoryErrorKind::Timeout => "Timeout",
            RepositoryErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(content_type) = &self.content_type {
            write!(f, " (content type: {content_type})")?;
        }

        Ok(())
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Content repository abstraction.
///
/// Entries are read-only snapshots; implementations must not cache across
/// calls in a way that changes results for identical queries against
/// unchanged content.
pub trait ContentRepository: Send + Sync {
    /// Return entries of `content_type` matching every filter, in backend order.
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backend cannot be read or the
    /// filter cannot be expressed.
    fn query(&self, content_type: &str, filters: &Filters) -> Result<Vec<Entry>, RepositoryError>;
}
