//! The transport seam and the response envelope.
//!
//! This crate never opens a connection. A [`Transport`] is handed a rendered
//! request and returns the engine's [`ResultEnvelope`]; retries, timeouts,
//! and connection pooling all live on the other side of this trait.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SearchError};

/// A stored document or a set of returned fields.
pub type Document = Map<String, Value>;

/// Highlighted fragments keyed by field name.
pub type Highlights = BTreeMap<String, Vec<String>>;

/// Executes requests against a search engine.
///
/// Implementations report network and engine failures as
/// [`SearchError::Transport`], and a missing index as
/// [`SearchError::IndexMissing`]. Callers see those errors unchanged.
pub trait Transport {
    /// Runs a search request against `index`, restricted to `doctype`.
    fn search(&self, request: &Value, index: &str, doctype: &str) -> Result<ResultEnvelope>;

    /// Finds documents similar to document `id`.
    ///
    /// `params` carries the similarity knobs (`mlt_fields`, `min_term_freq`,
    /// ...); `body` is a search request that further restricts the results.
    fn more_like_this(
        &self,
        index: &str,
        doctype: &str,
        id: &str,
        params: &Map<String, Value>,
        body: &Value,
    ) -> Result<ResultEnvelope> {
        let _ = (index, doctype, id, params, body);
        Err(SearchError::Transport(
            "more-like-this is not supported by this transport".to_string(),
        ))
    }

    /// Makes recent writes to `index` visible to searches.
    fn refresh(&self, index: &str) -> Result<()>;

    /// Deletes `index`.
    fn delete_index(&self, index: &str) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn search(&self, request: &Value, index: &str, doctype: &str) -> Result<ResultEnvelope> {
        (**self).search(request, index, doctype)
    }

    fn more_like_this(
        &self,
        index: &str,
        doctype: &str,
        id: &str,
        params: &Map<String, Value>,
        body: &Value,
    ) -> Result<ResultEnvelope> {
        (**self).more_like_this(index, doctype, id, params, body)
    }

    fn refresh(&self, index: &str) -> Result<()> {
        (**self).refresh(index)
    }

    fn delete_index(&self, index: &str) -> Result<()> {
        (**self).delete_index(index)
    }
}

/// A search response.
///
/// ```
/// use standout_search::ResultEnvelope;
///
/// let envelope = ResultEnvelope::from_json(r#"{
///     "took": 3,
///     "hits": {"total": 1, "hits": [
///         {"_id": "5", "_score": 0.3, "_type": "fake", "_source": {"id": 5}}
///     ]}
/// }"#).unwrap();
/// assert_eq!(envelope.hits.total, 1);
/// assert_eq!(envelope.hits.hits[0].id, "5");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Engine-side execution time in milliseconds.
    #[serde(default)]
    pub took: u64,
    /// The matching documents.
    #[serde(default)]
    pub hits: Hits,
    /// Raw facet results by facet name.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub facets: Map<String, Value>,
}

impl ResultEnvelope {
    /// Parses a response body.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Converts an already-parsed response.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// The `hits` section of a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hits {
    /// Total number of matches, regardless of slicing.
    #[serde(default)]
    pub total: u64,
    /// The returned window of matches.
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// A single hit as returned by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_type", default)]
    pub doc_type: Option<String>,
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlights>,
}
