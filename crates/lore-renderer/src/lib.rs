//! Markdown to HTML renderer for lore pieces.
//!
//! This crate provides [`MarkdownRenderer`], an event-driven renderer on top
//! of `pulldown-cmark` that produces semantic HTML5:
//!
//! - Fenced code blocks as `<pre><code class="language-x">`
//! - GitHub Flavored Markdown tables, strikethrough and task lists
//! - Unique heading ids and a table of contents
//!
//! # Example
//!
//! ```
//! use lore_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new().render_markdown("# Hello\n\n```go\nfmt.Println()\n```");
//!
//! assert_eq!(result.toc[0].id, "hello");
//! assert!(result.html.contains(r#"<code class="language-go">"#));
//! ```

mod renderer;
mod state;

pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::TocEntry;
