//! Typed content records.
//!
//! Each record is converted from a raw [`Entry`] with `TryFrom<&Entry>`.
//! Required fields that are absent fail with [`ModelError::MissingField`];
//! fields of the wrong shape fail with [`ModelError::InvalidField`].
//! Optional reference lists (`children`, `languages`) are empty when absent.

use lore_content::{Entry, link_id};
use serde::Serialize;
use serde_json::Value;

/// Error converting a raw entry into a typed record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Required field is absent.
    #[error("{content_type} '{id}': missing field '{field}'")]
    MissingField {
        content_type: &'static str,
        id: String,
        field: &'static str,
    },
    /// Field is present but has the wrong shape.
    #[error("{content_type} '{id}': field '{field}' must be {expected}")]
    InvalidField {
        content_type: &'static str,
        id: String,
        field: &'static str,
        expected: &'static str,
    },
}

/// A record stored under a fixed content type.
pub trait Record: Sized {
    /// Content type name used in repository queries.
    const CONTENT_TYPE: &'static str;
}

/// A record addressable by slug.
pub trait Slugged {
    fn slug(&self) -> &str;
}

/// Subject area with an ordered set of languages and one root node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Discipline {
    pub id: String,
    pub slug: String,
    /// Lowest order is the default discipline.
    pub order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Id of the root node.
    pub root: String,
    /// Ids of linked languages, in repository order (not sorted).
    pub languages: Vec<String>,
}

/// Presentation variant of a discipline's content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Language {
    pub id: String,
    pub slug: String,
    pub order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Topic in a discipline's content tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ordered child node ids. Empty for a leaf.
    pub children: Vec<String>,
}

impl Node {
    /// Check if the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Content for one (language, node) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Piece {
    pub id: String,
    pub title: String,
    /// Raw markdown body.
    pub body: String,
    /// Id of the linked language.
    pub language: String,
    /// Id of the linked node.
    pub node: String,
}

/// Sort languages ascending by order, keeping repository order on ties.
#[must_use]
pub fn sorted_languages(languages: &[Language]) -> Vec<Language> {
    let mut sorted = languages.to_vec();
    sorted.sort_by_key(|language| language.order);
    sorted
}

/// Field reader bound to one entry, producing errors with record context.
struct Fields<'a> {
    entry: &'a Entry,
    content_type: &'static str,
}

impl<'a> Fields<'a> {
    fn new(entry: &'a Entry, content_type: &'static str) -> Self {
        Self {
            entry,
            content_type,
        }
    }

    fn missing(&self, field: &'static str) -> ModelError {
        ModelError::MissingField {
            content_type: self.content_type,
            id: self.entry.id.clone(),
            field,
        }
    }

    fn invalid(&self, field: &'static str, expected: &'static str) -> ModelError {
        ModelError::InvalidField {
            content_type: self.content_type,
            id: self.entry.id.clone(),
            field,
            expected,
        }
    }

    /// Get a field, treating `null` as absent.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.entry.field(field).filter(|v| !v.is_null())
    }

    fn string(&self, field: &'static str) -> Result<String, ModelError> {
        self.optional_string(field)?
            .ok_or_else(|| self.missing(field))
    }

    fn optional_string(&self, field: &'static str) -> Result<Option<String>, ModelError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(field, "a string")),
        }
    }

    fn integer(&self, field: &'static str) -> Result<i64, ModelError> {
        self.get(field)
            .ok_or_else(|| self.missing(field))?
            .as_i64()
            .ok_or_else(|| self.invalid(field, "an integer"))
    }

    fn link(&self, field: &'static str) -> Result<String, ModelError> {
        let value = self.get(field).ok_or_else(|| self.missing(field))?;
        link_id(value)
            .map(str::to_owned)
            .ok_or_else(|| self.invalid(field, "a link"))
    }

    fn links(&self, field: &'static str) -> Result<Vec<String>, ModelError> {
        let Some(value) = self.get(field) else {
            return Ok(Vec::new());
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.invalid(field, "a list of links"))?;
        items
            .iter()
            .map(|item| {
                link_id(item)
                    .map(str::to_owned)
                    .ok_or_else(|| self.invalid(field, "a list of links"))
            })
            .collect()
    }
}

impl Record for Discipline {
    const CONTENT_TYPE: &'static str = "discipline";
}

impl TryFrom<&Entry> for Discipline {
    type Error = ModelError;

    fn try_from(entry: &Entry) -> Result<Self, Self::Error> {
        let fields = Fields::new(entry, Self::CONTENT_TYPE);
        Ok(Self {
            id: entry.id.clone(),
            slug: fields.string("slug")?,
            order: fields.integer("order")?,
            name: fields.optional_string("name")?,
            root: fields.link("root")?,
            languages: fields.links("languages")?,
        })
    }
}

impl Slugged for Discipline {
    fn slug(&self) -> &str {
        &self.slug
    }
}

impl Record for Language {
    const CONTENT_TYPE: &'static str = "language";
}

impl TryFrom<&Entry> for Language {
    type Error = ModelError;

    fn try_from(entry: &Entry) -> Result<Self, Self::Error> {
        let fields = Fields::new(entry, Self::CONTENT_TYPE);
        Ok(Self {
            id: entry.id.clone(),
            slug: fields.string("slug")?,
            order: fields.integer("order")?,
            name: fields.optional_string("name")?,
        })
    }
}

impl Slugged for Language {
    fn slug(&self) -> &str {
        &self.slug
    }
}

impl Record for Node {
    const CONTENT_TYPE: &'static str = "node";
}

impl TryFrom<&Entry> for Node {
    type Error = ModelError;

    fn try_from(entry: &Entry) -> Result<Self, Self::Error> {
        let fields = Fields::new(entry, Self::CONTENT_TYPE);
        Ok(Self {
            id: entry.id.clone(),
            slug: fields.string("slug")?,
            name: fields.optional_string("name")?,
            children: fields.links("children")?,
        })
    }
}

impl Slugged for Node {
    fn slug(&self) -> &str {
        &self.slug
    }
}

impl Record for Piece {
    const CONTENT_TYPE: &'static str = "piece";
}

impl TryFrom<&Entry> for Piece {
    type Error = ModelError;

    fn try_from(entry: &Entry) -> Result<Self, Self::Error> {
        let fields = Fields::new(entry, Self::CONTENT_TYPE);
        Ok(Self {
            id: entry.id.clone(),
            title: fields.string("title")?,
            body: fields.optional_string("body")?.unwrap_or_default(),
            language: fields.link("language")?,
            node: fields.link("node")?,
        })
    }
}
