//! Content tree model, path resolution and page navigation for lore.
//!
//! This crate provides:
//! - Typed records ([`Discipline`], [`Language`], [`Node`], [`Piece`]) built
//!   from raw repository entries
//! - [`NodeTree`]: node index with breadcrumb [`resolve_path`](NodeTree::resolve_path)
//! - [`Navigator`]: assembles a [`PageView`] for each URL shape
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use lore_content::FsRepository;
//! use lore_site::{HtmlRenderer, Navigator};
//!
//! let repository = Arc::new(FsRepository::new("content"));
//! let navigator = Navigator::new(repository, Arc::new(HtmlRenderer::new()))?;
//!
//! let view = navigator.node_view("biology", "go", "mitochondria")?;
//! for node in view.breadcrumbs.unwrap_or_default() {
//!     println!("{}", node.slug);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod model;
mod navigation;
mod page;
mod path;
mod render;

pub use error::NavigationError;
pub use model::{
    Discipline, Language, ModelError, Node, Piece, Record, Slugged, sorted_languages,
};
pub use navigation::Navigator;
pub use page::PageView;
pub use path::NodeTree;
pub use render::{ContentRenderer, HtmlRenderer, RenderedBody};

// Re-export TocEntry from lore-renderer for convenience
pub use lore_renderer::TocEntry;
