//! Content repository abstraction for lore.
//!
//! This crate provides a [`ContentRepository`] trait for fetching raw content
//! entries by content type and exact-match field filters. This enables:
//!
//! - **Unit testing** of navigation without a remote content service
//! - **Backend flexibility** (local YAML files, Contentful)
//! - **Clean separation** between the content-tree logic and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`ContentRepository`] trait with a single `query()` method
//! - [`Entry`] raw entity with an id, a content type and untyped fields
//! - [`Filters`] ordered field-path filters (`slug`, `language.slug`)
//! - [`FsRepository`] reading `<content_type>.yaml` files from a directory
//! - [`ContentfulRepository`] for the Contentful Delivery API
//! - [`MockRepository`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```no_run
//! use lore_content::{ContentRepository, Filters, FsRepository};
//!
//! let repository = FsRepository::new("content");
//! let entries = repository.query("discipline", &Filters::new().with("slug", "biology"))?;
//! for entry in entries {
//!     println!("{}", entry.id);
//! }
//! # Ok::<(), lore_content::RepositoryError>(())
//! ```

mod contentful;
mod entry;
mod fs;
#[cfg(feature = "mock")]
mod mock;
mod repository;

pub use contentful::{ContentfulConfig, ContentfulRepository};
pub use entry::{Entry, Filters, link_id};
pub use fs::FsRepository;
#[cfg(feature = "mock")]
pub use mock::MockRepository;
pub use repository::{ContentRepository, ErrorStatus, RepositoryError, RepositoryErrorKind};
