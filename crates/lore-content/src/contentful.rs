//! Contentful Delivery API repository.
//!
//! Provides a sync HTTP client for the Contentful Content Delivery API
//! with bearer-token authentication. Entries are normalized into the
//! backend-neutral [`Entry`] shape: `sys.id` becomes the entry id and link
//! objects (`{"sys": {"type": "Link", "id": ...}}`) become `{"id": ...}`.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value, json};
use ureq::Agent;

use crate::entry::{Entry, Filters};
use crate::repository::{ContentRepository, ErrorStatus, RepositoryError, RepositoryErrorKind};

const BACKEND: &str = "Contentful";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Entries requested per query. Results beyond this are not fetched.
const PAGE_LIMIT: &str = "1000";

/// Connection settings for [`ContentfulRepository`].
#[derive(Clone, Debug)]
pub struct ContentfulConfig {
    /// Delivery API base URL (e.g., `https://cdn.contentful.com`).
    pub base_url: String,
    /// Space id.
    pub space_id: String,
    /// Environment id (usually `master`).
    pub environment: String,
    /// Delivery API access token.
    pub access_token: String,
}

/// Content repository backed by the Contentful Delivery API.
pub struct ContentfulRepository {
    agent: Agent,
    entries_url: String,
    access_token: String,
}

impl ContentfulRepository {
    /// Create a repository from connection settings.
    #[must_use]
    pub fn new(config: &ContentfulConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            entries_url: format!(
                "{}/spaces/{}/environments/{}/entries",
                config.base_url.trim_end_matches('/'),
                config.space_id,
                config.environment
            ),
            access_token: config.access_token.clone(),
        }
    }

    fn fetch(&self, content_type: &str, params: &[(String, String)]) -> Result<Vec<Entry>, RepositoryError> {
        let mut request = self
            .agent
            .get(&self.entries_url)
            .header("Authorization", &format!("Bearer {}", self.access_token))
            .header("Accept", "application/json");
        for (key, value) in params {
            request = request.query(key, value);
        }

        let response = request.call().map_err(|e| {
            tracing::warn!(content_type, error = %e, "Contentful request failed");
            RepositoryError::new(RepositoryErrorKind::Unavailable)
                .with_status(ErrorStatus::Temporary)
                .with_source(e)
        })?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            tracing::warn!(content_type, status, "Contentful returned error status");
            let (kind, retry) = classify_status(status);
            return Err(RepositoryError::new(kind)
                .with_status(retry)
                .with_source(format!("HTTP {status}: {error_body}")));
        }

        let response: EntriesResponse = body_reader
            .read_json()
            .map_err(|e| RepositoryError::new(RepositoryErrorKind::InvalidData).with_source(e))?;

        Ok(response.into_entries())
    }
}

impl ContentRepository for ContentfulRepository {
    fn query(&self, content_type: &str, filters: &Filters) -> Result<Vec<Entry>, RepositoryError> {
        let params = query_params(content_type, filters)
            .map_err(|e| e.with_backend(BACKEND).with_content_type(content_type))?;

        let entries = self
            .fetch(content_type, &params)
            .map_err(|e| e.with_backend(BACKEND).with_content_type(content_type))?;

        tracing::debug!(content_type, count = entries.len(), "Queried Contentful");
        Ok(entries)
    }
}

/// Translate backend-neutral filters into Contentful query parameters.
///
/// - `id` → `sys.id`
/// - `slug` → `fields.slug`
/// - `language.slug` → `fields.language.sys.contentType.sys.id=language`
///   plus `fields.language.fields.slug`
fn query_params(content_type: &str, filters: &Filters) -> Result<Vec<(String, String)>, RepositoryError> {
    let mut params = vec![
        ("content_type".to_owned(), content_type.to_owned()),
        ("limit".to_owned(), PAGE_LIMIT.to_owned()),
    ];

    for (path, value) in filters.iter() {
        let segments: Vec<&str> = path.split('.').collect();
        match segments.as_slice() {
            ["id"] => params.push(("sys.id".to_owned(), value.to_owned())),
            [field] => params.push((format!("fields.{field}"), value.to_owned())),
            [link, "id"] => params.push((format!("fields.{link}.sys.id"), value.to_owned())),
            [link, field] => {
                // Contentful requires the linked content type for link-field queries;
                // the link field is named after the content type it points to.
                params.push((
                    format!("fields.{link}.sys.contentType.sys.id"),
                    (*link).to_owned(),
                ));
                params.push((format!("fields.{link}.fields.{field}"), value.to_owned()));
            }
            _ => {
                return Err(RepositoryError::new(RepositoryErrorKind::InvalidQuery)
                    .with_source(format!("unsupported filter path: {path}")));
            }
        }
    }

    Ok(params)
}

/// Map an HTTP error status to an error kind and retry guidance.
fn classify_status(status: u16) -> (RepositoryErrorKind, ErrorStatus) {
    match status {
        401 | 403 => (RepositoryErrorKind::Unauthorized, ErrorStatus::Permanent),
        404 => (RepositoryErrorKind::NotFound, ErrorStatus::Permanent),
        400 | 422 => (RepositoryErrorKind::InvalidQuery, ErrorStatus::Permanent),
        429 => (RepositoryErrorKind::RateLimited, ErrorStatus::Persistent),
        500..=599 => (RepositoryErrorKind::Unavailable, ErrorStatus::Persistent),
        _ => (RepositoryErrorKind::Other, ErrorStatus::Permanent),
    }
}

/// Response body of `GET /entries`.
#[derive(Deserialize)]
struct EntriesResponse {
    #[serde(default)]
    items: Vec<RawEntry>,
}

impl EntriesResponse {
    fn into_entries(self) -> Vec<Entry> {
        self.items.into_iter().map(RawEntry::into_entry).collect()
    }
}

#[derive(Deserialize)]
struct RawEntry {
    sys: EntrySys,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct EntrySys {
    id: String,
    #[serde(rename = "contentType")]
    content_type: Option<LinkRef>,
}

#[derive(Deserialize)]
struct LinkRef {
    sys: LinkSys,
}

#[derive(Deserialize)]
struct LinkSys {
    id: String,
}

impl RawEntry {
    fn into_entry(self) -> Entry {
        let fields = self
            .fields
            .into_iter()
            .map(|(k, v)| (k, normalize_links(v)))
            .collect();
        Entry {
            id: self.sys.id,
            content_type: self.sys.content_type.map(|c| c.sys.id).unwrap_or_default(),
            fields,
        }
    }
}

/// Replace Contentful link objects with `{"id": ...}`, recursing into arrays.
fn normalize_links(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_links).collect()),
        Value::Object(map) => match contentful_link_id(&map) {
            Some(id) => json!({ "id": id }),
            None => Value::Object(map),
        },
        other => other,
    }
}

fn contentful_link_id(map: &Map<String, Value>) -> Option<String> {
    let sys = map.get("sys")?.as_object()?;
    if sys.get("type")?.as_str()? != "Link" {
        return None;
    }
    sys.get("id")?.as_str().map(str::to_owned)
}
