//! Piece body rendering seam.

use lore_renderer::{MarkdownRenderer, TocEntry};

/// Rendered piece body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedBody {
    /// HTML markup.
    pub html: String,
    /// Table of contents of the body's headings.
    pub toc: Vec<TocEntry>,
}

/// Converts a raw piece body into markup.
///
/// Implementations must be pure: the same body always renders the same way.
pub trait ContentRenderer: Send + Sync {
    fn render(&self, body: &str) -> RenderedBody;
}

/// Markdown renderer for piece bodies.
#[derive(Clone, Debug)]
pub struct HtmlRenderer {
    gfm: bool,
}

impl HtmlRenderer {
    /// Create a renderer with GFM enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown extensions.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRenderer for HtmlRenderer {
    fn render(&self, body: &str) -> RenderedBody {
        let result = MarkdownRenderer::new()
            .with_gfm(self.gfm)
            .render_markdown(body);
        RenderedBody {
            html: result.html,
            toc: result.toc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_renderer_fenced_code() {
        let rendered = HtmlRenderer::new().render("```go\nfmt.Println(\"hi\")\n```");
        assert!(rendered.html.starts_with(r#"<pre><code class="language-go">"#));
    }

    #[test]
    fn test_html_renderer_toc() {
        let rendered = HtmlRenderer::new().render("# Cell\n\n## Parts");
        assert_eq!(rendered.toc.len(), 2);
        assert_eq!(rendered.toc[1].id, "parts");
    }

    #[test]
    fn test_html_renderer_without_gfm() {
        let rendered = HtmlRenderer::new().with_gfm(false).render("~~old~~");
        assert!(!rendered.html.contains("<s>"));
    }

    #[test]
    fn test_html_renderer_is_pure() {
        let renderer = HtmlRenderer::new();
        let body = "## FAQ\n\n## FAQ";
        assert_eq!(renderer.render(body), renderer.render(body));
    }
}
