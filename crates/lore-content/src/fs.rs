//! Filesystem content repository.
//!
//! Reads entries from YAML files in a content directory, one file per
//! content type:
//!
//! ```text
//! content/
//! ├── discipline.yaml
//! ├── language.yaml
//! ├── node.yaml
//! └── piece.yaml
//! ```
//!
//! Each file holds a YAML list of entries with an `id` and arbitrary fields:
//!
//! ```yaml
//! - id: cell
//!   slug: cell
//!   children:
//!     - id: organelles
//!     - id: membrane
//! ```
//!
//! Files are re-read on every query, so edits are visible without restart.

use std::path::PathBuf;

use crate::entry::{Entry, Filters, select};
use crate::repository::{ContentRepository, RepositoryError, RepositoryErrorKind};

const BACKEND: &str = "Fs";
const EXTENSION: &str = "yaml";

/// Content repository backed by YAML files.
#[derive(Debug, Clone)]
pub struct FsRepository {
    root: PathBuf,
}

impl FsRepository {
    /// Create a repository reading from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_for(&self, content_type: &str) -> PathBuf {
        self.root.join(format!("{content_type}.{EXTENSION}"))
    }

    /// Load all entries of one content type. A missing file yields no entries.
    fn load_type(&self, content_type: &str) -> Result<Vec<Entry>, RepositoryError> {
        let path = self.file_for(content_type);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RepositoryError::io(e)
                    .with_backend(BACKEND)
                    .with_content_type(content_type));
            }
        };

        parse_entries(&text, content_type).map_err(|e| e.with_backend(BACKEND))
    }

    /// Load `primary` plus every content type the filters link into.
    fn load_linked(&self, primary: &str, filters: &Filters) -> Result<Vec<Entry>, RepositoryError> {
        let mut entries = self.load_type(primary)?;
        for content_type in filters.linked_types() {
            if content_type != primary {
                entries.extend(self.load_type(content_type)?);
            }
        }
        Ok(entries)
    }
}

/// Parse a YAML list of entries, stamping each with `content_type`.
fn parse_entries(text: &str, content_type: &str) -> Result<Vec<Entry>, RepositoryError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<Entry> = serde_yaml::from_str(text).map_err(|e| {
        RepositoryError::new(RepositoryErrorKind::InvalidData)
            .with_source(e)
            .with_content_type(content_type)
    })?;

    for entry in &mut entries {
        content_type.clone_into(&mut entry.content_type);
    }

    Ok(entries)
}

impl ContentRepository for FsRepository {
    fn query(&self, content_type: &str, filters: &Filters) -> Result<Vec<Entry>, RepositoryError> {
        let entries = if filters.follows_links() {
            self.load_linked(content_type, filters)?
        } else {
            self.load_type(content_type)?
        };

        let selected = select(&entries, content_type, filters);
        tracing::debug!(
            content_type,
            dir = %self.root.display(),
            count = selected.len(),
            "Queried filesystem content"
        );
        Ok(selected)
    }
}
