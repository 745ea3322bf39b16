//! Raw content entries and query filters.
//!
//! An [`Entry`] is the untyped projection of one piece of externally managed
//! content. Reference fields hold links of the form `{ "id": "<entry id>" }`
//! (or lists of them); typed interpretation happens in the consumer.
//!
//! # Field Paths
//!
//! [`Filters`] keys are dot-separated field paths:
//! - `"slug"` - a field of the entry itself
//! - `"id"` - the entry id
//! - `"language.slug"` - follow the `language` link, then read `slug`
//!
//! Scalars are compared on their string rendering, so `order = "1"` matches
//! a numeric `order: 1`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw content entity returned by a [`ContentRepository`](crate::ContentRepository).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique entry id.
    pub id: String,
    /// Content type name (e.g., "discipline", "node").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_type: String,
    /// Content-type-specific fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Entry {
    /// Create an entry from a JSON object of fields.
    ///
    /// Non-object `fields` values produce an entry without fields.
    #[must_use]
    pub fn new(content_type: impl Into<String>, id: impl Into<String>, fields: Value) -> Self {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            content_type: content_type.into(),
            fields,
        }
    }

    /// Get a raw field value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get the target id of a single-link field.
    #[must_use]
    pub fn link_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(link_id)
    }
}

/// Extract the target id from a link value (`{ "id": "..." }`).
#[must_use]
pub fn link_id(value: &Value) -> Option<&str> {
    value.as_object()?.get("id")?.as_str()
}

/// Ordered exact-match filters keyed by field path.
///
/// Insertion order is preserved so that backends build deterministic queries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filters {
    items: Vec<(String, String)>,
}

impl Filters {
    /// Create an empty filter set (matches every entry of a content type).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact-match condition on a field path.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.push((path.into(), value.into()));
        self
    }

    /// Iterate over `(path, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check if there are no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if any condition follows a link (contains a `.`).
    #[must_use]
    pub fn follows_links(&self) -> bool {
        self.items.iter().any(|(k, _)| k.contains('.'))
    }

    /// Content types reached through links, in first-use order.
    ///
    /// Every segment but the last of a path names a linked content type.
    #[must_use]
    pub fn linked_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for (path, _) in &self.items {
            let Some((links, _)) = path.rsplit_once('.') else {
                continue;
            };
            for segment in links.split('.') {
                if !types.contains(&segment) {
                    types.push(segment);
                }
            }
        }
        types
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            items: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Lookup by content type and id over a set of entries, used by in-memory
/// filter evaluation.
///
/// A link segment names the content type of its target: `language.slug`
/// follows the `language` link into `language` entries only.
pub(crate) struct EntryIndex<'a> {
    by_type: HashMap<&'a str, HashMap<&'a str, &'a Entry>>,
}

impl<'a> EntryIndex<'a> {
    pub(crate) fn new(entries: &'a [Entry]) -> Self {
        let mut by_type: HashMap<&str, HashMap<&str, &Entry>> = HashMap::new();
        for entry in entries {
            // First entry wins on duplicate ids, matching query order
            by_type
                .entry(entry.content_type.as_str())
                .or_default()
                .entry(entry.id.as_str())
                .or_insert(entry);
        }
        Self { by_type }
    }

    /// Resolve a field path to its string rendering.
    ///
    /// A trailing `id` after a link reads the link itself, so `node.id`
    /// matches without the target being loaded.
    fn field_text(&self, entry: &'a Entry, path: &str) -> Option<String> {
        let segments: Vec<&str> = path.split('.').collect();
        let (&last, links) = segments.split_last()?;

        let mut current = entry;
        for (i, &segment) in links.iter().enumerate() {
            let target = current.link_field(segment)?;
            if last == "id" && i + 1 == links.len() {
                return Some(target.to_owned());
            }
            current = *self.by_type.get(segment)?.get(target)?;
        }

        if last == "id" {
            return Some(current.id.clone());
        }
        current.field(last).and_then(scalar_text)
    }

    /// Check whether an entry satisfies every filter condition.
    pub(crate) fn matches(&self, entry: &'a Entry, filters: &Filters) -> bool {
        filters
            .iter()
            .all(|(path, expected)| self.field_text(entry, path).as_deref() == Some(expected))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Select entries of a content type matching all filters, in source order.
pub(crate) fn select(entries: &[Entry], content_type: &str, filters: &Filters) -> Vec<Entry> {
    let index = EntryIndex::new(entries);
    entries
        .iter()
        .filter(|e| e.content_type == content_type && index.matches(e, filters))
        .cloned()
        .collect()
}
