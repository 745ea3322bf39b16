//! Mock repository implementation for testing.
//!
//! Provides [`MockRepository`] for unit testing without filesystem or
//! network access.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::entry::{Entry, Filters, select};
use crate::repository::{ContentRepository, RepositoryError, RepositoryErrorKind};

/// Mock repository for testing.
///
/// Stores entries in memory. Use the builder methods to configure the mock
/// with test data; filters are evaluated the same way as the filesystem
/// backend.
///
/// # Example
///
/// ```ignore
/// use serde_json::json;
/// use lore_content::{ContentRepository, Filters, MockRepository};
///
/// let repo = MockRepository::new()
///     .with_entry("language", "lang-go", json!({"slug": "go", "order": 1}));
///
/// let entries = repo.query("language", &Filters::new()).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockRepository {
    entries: RwLock<Vec<Entry>>,
    failures: RwLock<HashMap<String, RepositoryErrorKind>>,
    queries: RwLock<HashMap<String, usize>>,
}

impl MockRepository {
    /// Create a new empty mock repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry with the given content type, id and JSON fields.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_entry(
        self,
        content_type: impl Into<String>,
        id: impl Into<String>,
        fields: Value,
    ) -> Self {
        self.entries
            .write()
            .unwrap()
            .push(Entry::new(content_type, id, fields));
        self
    }

    /// Make every query for `content_type` fail with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, content_type: impl Into<String>, kind: RepositoryErrorKind) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(content_type.into(), kind);
        self
    }

    /// Number of queries issued for `content_type` so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn query_count(&self, content_type: &str) -> usize {
        self.queries
            .read()
            .unwrap()
            .get(content_type)
            .copied()
            .unwrap_or(0)
    }
}

impl ContentRepository for MockRepository {
    fn query(&self, content_type: &str, filters: &Filters) -> Result<Vec<Entry>, RepositoryError> {
        *self
            .queries
            .write()
            .unwrap()
            .entry(content_type.to_owned())
            .or_default() += 1;

        if let Some(kind) = self.failures.read().unwrap().get(content_type) {
            return Err(RepositoryError::new(*kind)
                .with_backend("Mock")
                .with_content_type(content_type));
        }

        Ok(select(&self.entries.read().unwrap(), content_type, filters))
    }
}
