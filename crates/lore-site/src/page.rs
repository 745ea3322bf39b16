//! Page view bundle handed to the presentation layer.

use lore_renderer::TocEntry;
use serde::Serialize;

use crate::model::{Discipline, Language, Node};

/// Everything needed to render one page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    /// Current discipline.
    pub discipline: Discipline,
    /// All disciplines, sorted by order.
    pub disciplines: Vec<Discipline>,
    /// Current language.
    pub language: Language,
    /// Languages of the current discipline, sorted by order.
    pub languages: Vec<Language>,
    /// Current node.
    pub node: Node,
    /// Root node of the current discipline.
    pub root: Node,
    /// Path from root to the current node.
    ///
    /// `None` when the current node is the root by default; `Some` (possibly
    /// empty) when a node was requested explicitly.
    pub breadcrumbs: Option<Vec<Node>>,
    /// Piece title.
    pub title: String,
    /// Rendered piece body.
    pub html: String,
    /// Table of contents of the piece body.
    pub toc: Vec<TocEntry>,
}
