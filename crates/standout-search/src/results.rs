//! Lazily executed, cached result sets.
//!
//! A [`ResultSet`] starts out unexecuted. The first read (`len`, `iter`,
//! `get`, `Debug` formatting, `facets`, ...) sends the request once and
//! caches the decorated hits; every later read uses the cache. Slicing
//! always produces a new unexecuted set whose request fetches only the
//! sliced window.

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeBounds;

use once_cell::unsync::OnceCell;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::facets::{parse_facets, FacetCounts};
use crate::query::{Projection, Search};
use crate::searcher::{Dispatch, Request};
use crate::traits::ModelStore;
use crate::transport::{Document, Highlights, RawHit, ResultEnvelope};

/// Number of hits shown by `Debug` before the output is truncated.
pub const REPR_OUTPUT_SIZE: usize = 20;

/// One result with its engine metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<T> {
    /// The document id.
    pub id: String,
    /// Relevance score, when the engine computed one.
    pub score: Option<f64>,
    /// The document type the hit came from.
    pub doc_type: Option<String>,
    /// Highlighted fragments for every highlighted field; `None` unless
    /// highlighting was requested.
    pub highlighted: Option<Highlights>,
    /// The projected result.
    pub value: T,
}

/// A result in the shape chosen by the search's projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Row<M> {
    /// A hydrated entity.
    Object(M),
    /// Field name to value.
    Dict(Document),
    /// Field values in field-list order.
    List(Vec<Value>),
}

impl<M> Row<M> {
    pub fn as_object(&self) -> Option<&M> {
        match self {
            Row::Object(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Document> {
        match self {
            Row::Dict(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Row::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<M> {
        match self {
            Row::Object(model) => Some(model),
            _ => None,
        }
    }
}

/// How object rows are built.
pub(crate) enum Hydrator<'a, M> {
    /// Straight from each hit.
    Source(fn(&RawHit) -> M),
    /// Looked up by id, all at once.
    Store(&'a dyn ModelStore<Model = M>),
}

impl<M> Clone for Hydrator<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Hydrator<'_, M> {}

struct Executed<M> {
    hits: Vec<SearchHit<Row<M>>>,
    total: u64,
    took: u64,
    facets: Map<String, Value>,
}

/// The results of a [`Search`], fetched on first read.
///
/// Obtained from [`Searcher::results`](crate::Searcher::results) and friends.
pub struct ResultSet<'a, M> {
    dispatch: Dispatch<'a>,
    search: Search,
    request: Request,
    hydrator: Hydrator<'a, M>,
    cache: OnceCell<Executed<M>>,
}

impl<'a, M> ResultSet<'a, M> {
    pub(crate) fn new(
        dispatch: Dispatch<'a>,
        search: Search,
        request: Request,
        hydrator: Hydrator<'a, M>,
    ) -> Self {
        ResultSet {
            dispatch,
            search,
            request,
            hydrator,
            cache: OnceCell::new(),
        }
    }

    /// The search these results belong to.
    pub fn search(&self) -> &Search {
        &self.search
    }

    /// Returns `true` once the request has been sent and cached.
    pub fn is_executed(&self) -> bool {
        self.cache.get().is_some()
    }

    // ========================================================================
    // Reads (execute on first use)
    // ========================================================================

    /// Number of hits in this (possibly sliced) set.
    pub fn len(&self) -> Result<usize> {
        Ok(self.executed()?.hits.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.executed()?.hits.is_empty())
    }

    /// All decorated hits.
    pub fn hits(&self) -> Result<&[SearchHit<Row<M>>]> {
        Ok(&self.executed()?.hits)
    }

    pub fn iter(&self) -> Result<std::slice::Iter<'_, SearchHit<Row<M>>>> {
        Ok(self.executed()?.hits.iter())
    }

    /// The hit at `index`, if there is one.
    ///
    /// This executes and caches the whole set. To fetch a single hit without
    /// that, read `self.slice(index..=index)` instead.
    pub fn get(&self, index: usize) -> Result<Option<&SearchHit<Row<M>>>> {
        Ok(self.executed()?.hits.get(index))
    }

    pub fn to_vec(&self) -> Result<Vec<SearchHit<Row<M>>>>
    where
        M: Clone,
    {
        Ok(self.executed()?.hits.clone())
    }

    /// Consumes the set, returning its hits.
    pub fn into_hits(mut self) -> Result<Vec<SearchHit<Row<M>>>> {
        match self.cache.take() {
            Some(executed) => Ok(executed.hits),
            None => Ok(self.execute()?.hits),
        }
    }

    /// Engine-side execution time in milliseconds.
    pub fn took(&self) -> Result<u64> {
        Ok(self.executed()?.took)
    }

    /// The raw facet mapping from the response.
    pub fn raw_facets(&self) -> Result<&Map<String, Value>> {
        Ok(&self.executed()?.facets)
    }

    /// Buckets of every `terms` and `range` facet.
    pub fn facets(&self) -> Result<FacetCounts> {
        Ok(parse_facets(&self.executed()?.facets))
    }

    // ========================================================================
    // Requests that bypass the cache
    // ========================================================================

    /// Total number of matches, ignoring any slice.
    ///
    /// Uses the cached total once executed; otherwise asks the engine for
    /// zero hits and reads the total.
    pub fn count(&self) -> Result<u64> {
        if let Some(executed) = self.cache.get() {
            return Ok(executed.total);
        }
        let probe = self.search.slice(..0);
        Ok(self.dispatch.send(&probe, &self.request)?.hits.total)
    }

    /// Sends the request again and returns the undecorated response.
    pub fn raw(&self) -> Result<ResultEnvelope> {
        self.dispatch.send(&self.search, &self.request)
    }

    /// A new, unexecuted set over a window of this one.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> ResultSet<'a, M> {
        ResultSet::new(
            self.dispatch,
            self.search.slice(range),
            self.request.clone(),
            self.hydrator,
        )
    }

    // ========================================================================
    // Execution
    // ========================================================================

    fn executed(&self) -> Result<&Executed<M>> {
        self.cache.get_or_try_init(|| self.execute())
    }

    fn execute(&self) -> Result<Executed<M>> {
        let envelope = self.dispatch.send(&self.search, &self.request)?;
        let hits = self.decorate(&envelope.hits.hits)?;
        Ok(Executed {
            hits,
            total: envelope.hits.total,
            took: envelope.took,
            facets: envelope.facets,
        })
    }

    fn decorate(&self, raw: &[RawHit]) -> Result<Vec<SearchHit<Row<M>>>> {
        let fields = self.search.field_list();
        let rows: Vec<(&RawHit, Row<M>)> = match self.search.projection() {
            Projection::Object => self.hydrate(raw)?,
            Projection::Dict(_) => raw
                .iter()
                .map(|hit| (hit, Row::Dict(dict_row(hit, fields.is_some()))))
                .collect(),
            Projection::List(_) => raw
                .iter()
                .map(|hit| (hit, Row::List(list_row(hit, fields.as_deref()))))
                .collect(),
        };

        let highlighted = self.search.highlight_spec().map(|spec| &spec.fields);
        Ok(rows
            .into_iter()
            .map(|(hit, value)| SearchHit {
                id: hit.id.clone(),
                score: hit.score,
                doc_type: hit.doc_type.clone(),
                highlighted: highlighted.map(|fields| highlights_for(hit, fields)),
                value,
            })
            .collect())
    }

    fn hydrate<'r>(&self, raw: &'r [RawHit]) -> Result<Vec<(&'r RawHit, Row<M>)>> {
        match self.hydrator {
            Hydrator::Source(build) => Ok(raw
                .iter()
                .map(|hit| (hit, Row::Object(build(hit))))
                .collect()),
            Hydrator::Store(store) => {
                let ids: Vec<String> = raw.iter().map(|hit| hit.id.clone()).collect();
                let mut models: HashMap<String, M> = store.lookup_many(&ids)?;
                Ok(raw
                    .iter()
                    .filter_map(|hit| models.remove(&hit.id).map(|m| (hit, Row::Object(m))))
                    .collect())
            }
        }
    }
}

fn dict_row(hit: &RawHit, fields_requested: bool) -> Document {
    let (preferred, fallback) = if fields_requested {
        (&hit.fields, &hit.source)
    } else {
        (&hit.source, &hit.fields)
    };
    preferred
        .as_ref()
        .or(fallback.as_ref())
        .cloned()
        .unwrap_or_default()
}

fn list_row(hit: &RawHit, fields: Option<&[String]>) -> Vec<Value> {
    match fields {
        Some(fields) => {
            let doc = hit.fields.as_ref().or(hit.source.as_ref());
            fields
                .iter()
                .map(|field| {
                    doc.and_then(|doc| doc.get(field))
                        .cloned()
                        .unwrap_or(Value::Null)
                })
                .collect()
        }
        None => hit
            .source
            .as_ref()
            .map(|doc| doc.values().cloned().collect())
            .unwrap_or_default(),
    }
}

fn highlights_for(hit: &RawHit, fields: &[String]) -> Highlights {
    fields
        .iter()
        .map(|field| {
            let fragments = hit
                .highlight
                .as_ref()
                .and_then(|h| h.get(field))
                .cloned()
                .unwrap_or_default();
            (field.clone(), fragments)
        })
        .collect()
}

impl<M: fmt::Debug> fmt::Debug for ResultSet<'_, M> {
    /// Formats like the `Vec` of hits, truncated after
    /// [`REPR_OUTPUT_SIZE`] entries. Formatting executes the search.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let executed = match self.executed() {
            Ok(executed) => executed,
            Err(err) => return write!(f, "<search failed: {}>", err),
        };
        let mut list = f.debug_list();
        list.entries(executed.hits.iter().take(REPR_OUTPUT_SIZE));
        if executed.hits.len() > REPR_OUTPUT_SIZE {
            list.entry(&"...(remaining elements truncated)...");
        }
        list.finish()
    }
}
