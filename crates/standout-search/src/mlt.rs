//! More-like-this searches.
//!
//! A [`MoreLikeThis`] asks the engine for documents similar to one stored
//! document. The wrapped [`Search`] narrows the candidates: its filters and
//! queries travel as the request body.

use serde_json::{Map, Value};

use crate::query::Search;
use crate::value::Number;

/// A similarity search around document `id`.
///
/// ```
/// use standout_search::{MoreLikeThis, Search};
/// use serde_json::json;
///
/// let mlt = MoreLikeThis::new(Search::new("fake"), 1, ["foo"])
///     .min_term_freq(1)
///     .min_doc_freq(1);
///
/// assert_eq!(mlt.id(), "1");
/// assert_eq!(mlt.params()["mlt_fields"], json!("foo"));
/// assert_eq!(mlt.params()["min_term_freq"], json!(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MoreLikeThis {
    search: Search,
    id: String,
    fields: Vec<String>,
    params: Vec<(String, Number)>,
}

impl MoreLikeThis {
    /// Creates a similarity search comparing `fields` of document `id`.
    pub fn new<I, S>(search: Search, id: impl ToString, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MoreLikeThis {
            search,
            id: id.to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
            params: Vec::new(),
        }
    }

    /// Minimum times a term must appear in the source document.
    pub fn min_term_freq(self, value: impl Into<Number>) -> Self {
        self.param("min_term_freq", value)
    }

    /// Minimum number of documents a term must appear in.
    pub fn min_doc_freq(self, value: impl Into<Number>) -> Self {
        self.param("min_doc_freq", value)
    }

    /// Sets any other numeric engine parameter. Later values replace earlier ones.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Number>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    pub fn search(&self) -> &Search {
        &self.search
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the engine parameters, `mlt_fields` first.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        if !self.fields.is_empty() {
            params.insert("mlt_fields".to_string(), Value::from(self.fields.join(",")));
        }
        for (name, value) in &self.params {
            params.insert(name.clone(), value.to_json());
        }
        params
    }

    /// Returns the request body: the wrapped search, compiled.
    pub fn body(&self) -> Value {
        self.search.build_query()
    }
}
