//! Page view assembly.
//!
//! [`Navigator`] resolves the slugs of one request against the content
//! repository, picks defaults for absent slugs, resolves the breadcrumb path
//! and renders the matching piece. Every call reads the repository afresh.
//!
//! The independent collection reads of one view run in parallel on a
//! dedicated I/O thread pool owned by the navigator, so slow repository
//! round trips never occupy the global rayon pool.

use std::collections::HashMap;
use std::sync::Arc;

use lore_content::{ContentRepository, Entry, Filters};

use crate::error::NavigationError;
use crate::model::{Discipline, Language, ModelError, Node, Piece, Record, Slugged, sorted_languages};
use crate::page::PageView;
use crate::path::NodeTree;
use crate::render::ContentRenderer;

/// Slugs supplied by one request.
#[derive(Clone, Copy, Debug, Default)]
struct ViewRequest<'a> {
    discipline: Option<&'a str>,
    language: Option<&'a str>,
    node: Option<&'a str>,
}

/// Default number of threads for parallel repository reads.
const DEFAULT_IO_THREADS: usize = 16;

/// Assembles page views from repository content.
pub struct Navigator {
    repository: Arc<dyn ContentRepository>,
    renderer: Arc<dyn ContentRenderer>,
    pool: rayon::ThreadPool,
}

impl Navigator {
    /// Create a navigator over a repository and a body renderer with
    /// 16 I/O threads.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::ThreadPool`] if the I/O pool cannot be created.
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        renderer: Arc<dyn ContentRenderer>,
    ) -> Result<Self, NavigationError> {
        Self::with_io_threads(repository, renderer, DEFAULT_IO_THREADS)
    }

    /// Create a navigator whose I/O pool has `io_threads` threads.
    ///
    /// Each view issues three concurrent reads, so the pool serves
    /// `io_threads / 3` views at full parallelism.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::ThreadPool`] if the I/O pool cannot be created.
    pub fn with_io_threads(
        repository: Arc<dyn ContentRepository>,
        renderer: Arc<dyn ContentRenderer>,
        io_threads: usize,
    ) -> Result<Self, NavigationError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(io_threads)
            .thread_name(|i| format!("lore-io-{i}"))
            .build()?;

        Ok(Self {
            repository,
            renderer,
            pool,
        })
    }

    /// All disciplines sorted by order (stable on ties).
    ///
    /// # Errors
    ///
    /// Returns an error if the repository query fails or an entry is malformed.
    pub fn disciplines(&self) -> Result<Vec<Discipline>, NavigationError> {
        let mut disciplines = self.load::<Discipline>()?;
        disciplines.sort_by_key(|d| d.order);
        Ok(disciplines)
    }

    /// View with no slugs: lowest-order discipline, its lowest-order
    /// language and its root node.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::NoDisciplines`] or
    /// [`NavigationError::NoLanguages`] when there is nothing to default to,
    /// plus the errors of [`node_view`](Self::node_view).
    pub fn default_view(&self) -> Result<PageView, NavigationError> {
        self.view(ViewRequest::default())
    }

    /// View of a discipline with its default language at the root node.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::NotFound`] for an unknown discipline slug,
    /// plus the errors of [`default_view`](Self::default_view).
    pub fn discipline_view(&self, discipline: &str) -> Result<PageView, NavigationError> {
        self.view(ViewRequest {
            discipline: Some(discipline),
            ..ViewRequest::default()
        })
    }

    /// View of a discipline and language at the root node.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::NotFound`] for an unknown slug, plus the
    /// errors of [`node_view`](Self::node_view).
    pub fn language_view(
        &self,
        discipline: &str,
        language: &str,
    ) -> Result<PageView, NavigationError> {
        self.view(ViewRequest {
            discipline: Some(discipline),
            language: Some(language),
            node: None,
        })
    }

    /// View of a specific node, with the breadcrumb path from the root.
    ///
    /// # Errors
    ///
    /// - [`NavigationError::NotFound`] for an unknown slug
    /// - [`NavigationError::RootNotFound`] if the discipline's root is missing
    /// - [`NavigationError::PieceNotFound`] if no piece exists for the pair
    /// - [`NavigationError::Repository`] / [`NavigationError::Model`] for
    ///   backend failures and malformed entries
    pub fn node_view(
        &self,
        discipline: &str,
        language: &str,
        node: &str,
    ) -> Result<PageView, NavigationError> {
        self.view(ViewRequest {
            discipline: Some(discipline),
            language: Some(language),
            node: Some(node),
        })
    }

    fn view(&self, request: ViewRequest<'_>) -> Result<PageView, NavigationError> {
        // The three collections are independent reads
        let (disciplines, (languages, nodes)) = self.pool.join(
            || self.load::<Discipline>(),
            || rayon::join(|| self.load::<Language>(), || self.load::<Node>()),
        );
        let disciplines = disciplines?;
        let all_languages = languages?;
        let tree = NodeTree::new(nodes?);

        let mut sorted_disciplines = disciplines.clone();
        sorted_disciplines.sort_by_key(|d| d.order);

        let discipline = match request.discipline {
            Some(slug) => find_by_slug(&disciplines, slug)?,
            None => sorted_disciplines
                .first()
                .ok_or(NavigationError::NoDisciplines)?,
        }
        .clone();

        let languages = sorted_languages(&languages_of(&discipline, &all_languages));
        let language = match request.language {
            Some(slug) => find_by_slug(&all_languages, slug)?.clone(),
            None => languages
                .first()
                .cloned()
                .ok_or_else(|| NavigationError::NoLanguages {
                    discipline: discipline.slug.clone(),
                })?,
        };

        let root = tree.root_for(&discipline)?;
        let (node, breadcrumbs) = match request.node {
            Some(slug) => {
                let node = find_by_slug(tree.nodes(), slug)?;
                let path = tree.resolve_path(root, node).into_iter().cloned().collect();
                (node, Some(path))
            }
            None => (root, None),
        };

        let piece = self.piece(&language, node)?;
        let rendered = self.renderer.render(&piece.body);

        tracing::debug!(
            discipline = %discipline.slug,
            language = %language.slug,
            node = %node.slug,
            "Assembled page view"
        );

        Ok(PageView {
            node: node.clone(),
            root: root.clone(),
            discipline,
            disciplines: sorted_disciplines,
            language,
            languages,
            breadcrumbs,
            title: piece.title,
            html: rendered.html,
            toc: rendered.toc,
        })
    }

    /// Fetch the piece for a (language, node) pair; the first match wins.
    fn piece(&self, language: &Language, node: &Node) -> Result<Piece, NavigationError> {
        let filters = Filters::new()
            .with("language.slug", &language.slug)
            .with("node.slug", &node.slug);
        let entries = self.repository.query(Piece::CONTENT_TYPE, &filters)?;

        if entries.len() > 1 {
            tracing::debug!(
                language = %language.slug,
                node = %node.slug,
                matches = entries.len(),
                "Multiple pieces match, using the first"
            );
        }

        let entry = entries
            .first()
            .ok_or_else(|| NavigationError::PieceNotFound {
                language: language.slug.clone(),
                node: node.slug.clone(),
            })?;
        Ok(Piece::try_from(entry)?)
    }

    /// Load every record of one content type, in repository order.
    fn load<T>(&self) -> Result<Vec<T>, NavigationError>
    where
        T: Record + for<'e> TryFrom<&'e Entry, Error = ModelError>,
    {
        let entries = self.repository.query(T::CONTENT_TYPE, &Filters::new())?;
        let records = entries
            .iter()
            .map(T::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

/// Find the first record with `slug`, in repository order.
fn find_by_slug<'a, T: Record + Slugged>(
    records: &'a [T],
    slug: &str,
) -> Result<&'a T, NavigationError> {
    let mut matches = records.iter().filter(|r| r.slug() == slug);
    let first = matches.next().ok_or_else(|| NavigationError::NotFound {
        kind: T::CONTENT_TYPE,
        slug: slug.to_owned(),
    })?;

    let extra = matches.count();
    if extra > 0 {
        tracing::debug!(
            content_type = T::CONTENT_TYPE,
            slug,
            matches = extra + 1,
            "Ambiguous slug, using the first match"
        );
    }

    Ok(first)
}

/// Languages linked from a discipline, in link order.
fn languages_of(discipline: &Discipline, languages: &[Language]) -> Vec<Language> {
    let mut by_id: HashMap<&str, &Language> = HashMap::with_capacity(languages.len());
    for language in languages {
        by_id.entry(language.id.as_str()).or_insert(language);
    }

    discipline
        .languages
        .iter()
        .filter_map(|id| {
            let language = by_id.get(id.as_str()).copied().cloned();
            if language.is_none() {
                tracing::warn!(
                    discipline = %discipline.slug,
                    language = %id,
                    "Discipline links a missing language"
                );
            }
            language
        })
        .collect()
}

#[cfg(test)]
mod tests {
    static_assertions::assert_impl_all!(super::Navigator: Send, Sync);

    use lore_content::{MockRepository, RepositoryErrorKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::render::RenderedBody;

    /// Renderer that wraps the raw body so tests can see what was rendered.
    struct FakeRenderer;

    impl ContentRenderer for FakeRenderer {
        fn render(&self, body: &str) -> RenderedBody {
            RenderedBody {
                html: format!("<fake>{body}</fake>"),
                toc: Vec::new(),
            }
        }
    }

    fn piece(repo: MockRepository, id: &str, language: &str, node: &str) -> MockRepository {
        repo.with_entry(
            "piece",
            id,
            json!({
                "title": format!("{node} in {language}"),
                "body": format!("body of {id}"),
                "language": {"id": format!("lang-{language}")},
                "node": {"id": node},
            }),
        )
    }

    /// Two disciplines sharing two languages.
    ///
    /// ```text
    /// biology (order 2)      chemistry (order 1)
    /// cell                   atom
    /// ├── organelles         ├── electron
    /// │   └── mitochondria   └── intro
    /// └── membrane
    /// ```
    fn fixture() -> MockRepository {
        let repo = MockRepository::new()
            .with_entry(
                "discipline",
                "d-bio",
                json!({
                    "slug": "biology",
                    "order": 2,
                    "root": {"id": "cell"},
                    "languages": [{"id": "lang-go"}, {"id": "lang-python"}],
                }),
            )
            .with_entry(
                "discipline",
                "d-chem",
                json!({
                    "slug": "chemistry",
                    "order": 1,
                    "root": {"id": "atom"},
                    "languages": [{"id": "lang-python"}, {"id": "lang-go"}],
                }),
            )
            .with_entry("language", "lang-python", json!({"slug": "python", "order": 2}))
            .with_entry("language", "lang-go", json!({"slug": "go", "order": 1}))
            .with_entry(
                "node",
                "cell",
                json!({"slug": "cell", "children": [{"id": "organelles"}, {"id": "membrane"}]}),
            )
            .with_entry(
                "node",
                "organelles",
                json!({"slug": "organelles", "children": [{"id": "mitochondria"}]}),
            )
            .with_entry("node", "membrane", json!({"slug": "membrane"}))
            .with_entry("node", "mitochondria", json!({"slug": "mitochondria"}))
            .with_entry(
                "node",
                "atom",
                json!({"slug": "atom", "children": [{"id": "electron"}, {"id": "intro"}]}),
            )
            .with_entry("node", "electron", json!({"slug": "electron"}))
            .with_entry("node", "intro", json!({"slug": "intro"}));

        let repo = piece(repo, "p1", "go", "atom");
        let repo = piece(repo, "p2", "python", "atom");
        let repo = piece(repo, "p3", "go", "cell");
        let repo = piece(repo, "p4", "go", "mitochondria");
        piece(repo, "p5", "go", "cell")
    }

    fn navigator(repo: MockRepository) -> Navigator {
        Navigator::new(Arc::new(repo), Arc::new(FakeRenderer)).unwrap()
    }

    fn slugs<T: Slugged>(items: &[T]) -> Vec<&str> {
        items.iter().map(Slugged::slug).collect()
    }

    #[test]
    fn test_default_view_picks_lowest_order() {
        let view = navigator(fixture()).default_view().unwrap();

        assert_eq!(view.discipline.slug, "chemistry");
        assert_eq!(slugs(&view.disciplines), vec!["chemistry", "biology"]);
        assert_eq!(view.language.slug, "go");
        assert_eq!(slugs(&view.languages), vec!["go", "python"]);
        assert_eq!(view.node.slug, "atom");
        assert_eq!(view.root.slug, "atom");
        assert_eq!(view.breadcrumbs, None);
        assert_eq!(view.title, "atom in go");
        assert_eq!(view.html, "<fake>body of p1</fake>");
    }

    #[test]
    fn test_discipline_view_uses_defaults() {
        let view = navigator(fixture()).discipline_view("biology").unwrap();

        assert_eq!(view.discipline.slug, "biology");
        assert_eq!(view.language.slug, "go");
        assert_eq!(view.node.slug, "cell");
        assert_eq!(view.breadcrumbs, None);
    }

    #[test]
    fn test_language_view_explicit_slug_overrides_default() {
        let view = navigator(fixture())
            .language_view("chemistry", "python")
            .unwrap();

        assert_eq!(view.language.slug, "python");
        assert_eq!(slugs(&view.languages), vec!["go", "python"]);
        assert_eq!(view.node.slug, "atom");
        assert_eq!(view.title, "atom in python");
        assert_eq!(view.breadcrumbs, None);
    }

    #[test]
    fn test_node_view_breadcrumbs() {
        let view = navigator(fixture())
            .node_view("biology", "go", "mitochondria")
            .unwrap();

        let crumbs = view.breadcrumbs.unwrap();
        assert_eq!(slugs(&crumbs), vec!["cell", "organelles", "mitochondria"]);
        assert_eq!(view.node.slug, "mitochondria");
        assert_eq!(view.root.slug, "cell");
        assert_eq!(view.html, "<fake>body of p4</fake>");
    }

    #[test]
    fn test_node_view_root_node_has_empty_breadcrumbs() {
        let view = navigator(fixture())
            .node_view("biology", "go", "cell")
            .unwrap();

        assert_eq!(view.breadcrumbs, Some(Vec::new()));
    }

    #[test]
    fn test_node_view_node_outside_discipline_has_empty_breadcrumbs() {
        let repo = piece(fixture(), "p6", "go", "electron");

        let view = navigator(repo)
            .node_view("biology", "go", "electron")
            .unwrap();

        assert_eq!(view.breadcrumbs, Some(Vec::new()));
        assert_eq!(view.node.slug, "electron");
    }

    #[test]
    fn test_missing_piece_is_not_found() {
        let err = navigator(fixture())
            .node_view("chemistry", "go", "intro")
            .unwrap_err();

        assert!(matches!(
            err,
            NavigationError::PieceNotFound { ref language, ref node }
                if language == "go" && node == "intro"
        ));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unknown_slugs_are_not_found() {
        let nav = navigator(fixture());

        let err = nav.discipline_view("alchemy").unwrap_err();
        assert!(matches!(err, NavigationError::NotFound { kind: "discipline", .. }));

        let err = nav.language_view("biology", "cobol").unwrap_err();
        assert!(matches!(err, NavigationError::NotFound { kind: "language", .. }));

        let err = nav.node_view("biology", "go", "nucleus").unwrap_err();
        assert!(matches!(err, NavigationError::NotFound { kind: "node", .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let repo = MockRepository::new()
            .with_entry(
                "discipline",
                "d1",
                json!({"slug": "physics", "order": 1, "root": {"id": "ghost"}, "languages": [{"id": "lang-go"}]}),
            )
            .with_entry("language", "lang-go", json!({"slug": "go", "order": 1}))
            .with_entry("node", "quark", json!({"slug": "quark"}));

        let err = navigator(repo).default_view().unwrap_err();

        assert!(matches!(err, NavigationError::RootNotFound { ref root, .. } if root == "ghost"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_no_disciplines() {
        let err = navigator(MockRepository::new()).default_view().unwrap_err();
        assert!(matches!(err, NavigationError::NoDisciplines));
    }

    #[test]
    fn test_discipline_without_languages() {
        let repo = MockRepository::new()
            .with_entry(
                "discipline",
                "d1",
                json!({"slug": "physics", "order": 1, "root": {"id": "quark"}}),
            )
            .with_entry("node", "quark", json!({"slug": "quark"}));

        let err = navigator(repo).default_view().unwrap_err();

        assert!(matches!(err, NavigationError::NoLanguages { ref discipline } if discipline == "physics"));
    }

    #[test]
    fn test_repository_failure_propagates() {
        let repo = fixture().with_failure("node", RepositoryErrorKind::Unavailable);

        let err = navigator(repo).default_view().unwrap_err();

        assert!(matches!(
            err,
            NavigationError::Repository(ref e) if e.kind == RepositoryErrorKind::Unavailable
        ));
    }

    #[test]
    fn test_malformed_entry_is_model_error() {
        let repo = fixture().with_entry("language", "bad", json!({"slug": "rust"}));

        let err = navigator(repo).default_view().unwrap_err();

        assert!(matches!(err, NavigationError::Model(_)));
    }

    #[test]
    fn test_ambiguous_piece_uses_first() {
        // p3 and p5 both match (go, cell)
        let view = navigator(fixture()).discipline_view("biology").unwrap();
        assert_eq!(view.html, "<fake>body of p3</fake>");
    }

    #[test]
    fn test_ambiguous_slug_uses_first() {
        let repo = fixture().with_entry(
            "discipline",
            "d-bio-2",
            json!({"slug": "biology", "order": 0, "root": {"id": "atom"}}),
        );

        let view = navigator(repo).discipline_view("biology").unwrap();

        assert_eq!(view.discipline.id, "d-bio");
    }

    #[test]
    fn test_stable_default_on_order_ties() {
        let repo = MockRepository::new()
            .with_entry(
                "discipline",
                "first",
                json!({"slug": "first", "order": 1, "root": {"id": "n"}, "languages": [{"id": "l"}]}),
            )
            .with_entry(
                "discipline",
                "second",
                json!({"slug": "second", "order": 1, "root": {"id": "n"}, "languages": [{"id": "l"}]}),
            )
            .with_entry("language", "l", json!({"slug": "go", "order": 1}))
            .with_entry("node", "n", json!({"slug": "n"}));
        let repo = repo.with_entry(
            "piece",
            "p",
            json!({"title": "t", "body": "", "language": {"id": "l"}, "node": {"id": "n"}}),
        );

        let view = navigator(repo).default_view().unwrap();

        assert_eq!(view.discipline.slug, "first");
    }

    #[test]
    fn test_dangling_language_link_is_skipped() {
        let repo = fixture().with_entry(
            "discipline",
            "d-geo",
            json!({
                "slug": "geology",
                "order": 3,
                "root": {"id": "atom"},
                "languages": [{"id": "lang-missing"}, {"id": "lang-python"}],
            }),
        );

        let view = navigator(repo).discipline_view("geology").unwrap();

        assert_eq!(slugs(&view.languages), vec!["python"]);
        assert_eq!(view.language.slug, "python");
    }

    #[test]
    fn test_view_is_idempotent() {
        let nav = navigator(fixture());

        let first = nav.node_view("biology", "go", "mitochondria").unwrap();
        let second = nav.node_view("biology", "go", "mitochondria").unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_view_reads_each_collection_once() {
        let repo = Arc::new(fixture());
        let nav = Navigator::new(
            Arc::clone(&repo) as Arc<dyn ContentRepository>,
            Arc::new(FakeRenderer),
        )
        .unwrap();

        nav.node_view("biology", "go", "mitochondria").unwrap();

        assert_eq!(repo.query_count("discipline"), 1);
        assert_eq!(repo.query_count("language"), 1);
        assert_eq!(repo.query_count("node"), 1);
        assert_eq!(repo.query_count("piece"), 1);
    }

    #[test]
    fn test_disciplines_sorted() {
        let disciplines = navigator(fixture()).disciplines().unwrap();
        assert_eq!(slugs(&disciplines), vec!["chemistry", "biology"]);
    }

    #[test]
    fn test_page_view_serialization() {
        let view = navigator(fixture()).default_view().unwrap();

        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(value["discipline"]["slug"], "chemistry");
        assert_eq!(value["root"]["children"], json!(["electron", "intro"]));
        assert_eq!(value["breadcrumbs"], serde_json::Value::Null);
        assert_eq!(value["title"], "atom in go");
        assert!(value["language"].get("name").is_none());
    }

    #[test]
    fn test_single_io_thread_still_assembles_views() {
        let nav = Navigator::with_io_threads(Arc::new(fixture()), Arc::new(FakeRenderer), 1).unwrap();

        let view = nav.node_view("biology", "go", "mitochondria").unwrap();

        assert_eq!(view.title, "mitochondria in go");
    }

    #[test]
    fn test_views_do_not_depend_on_global_pool() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::{RwLock, mpsc};
        use std::time::Duration;

        // Park every global rayon worker until the view is done
        let gate = Arc::new(RwLock::new(()));
        let held = gate.write().unwrap();
        let parked = Arc::new(AtomicUsize::new(0));
        let workers = rayon::current_num_threads();
        for _ in 0..workers {
            let gate = Arc::clone(&gate);
            let parked = Arc::clone(&parked);
            rayon::spawn(move || {
                parked.fetch_add(1, Ordering::SeqCst);
                drop(gate.read().unwrap());
            });
        }
        while parked.load(Ordering::SeqCst) < workers {
            std::thread::yield_now();
        }

        let nav = navigator(fixture());
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(nav.default_view().map(|v| v.title));
        });
        let result = rx.recv_timeout(Duration::from_secs(10));
        drop(held);

        assert_eq!(result.unwrap().unwrap(), "atom in go");
    }
}
