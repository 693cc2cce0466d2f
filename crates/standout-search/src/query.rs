//! The search builder.
//!
//! [`Search`] accumulates everything a request needs: query clauses, a
//! filter tree, weights, sort order, facets, highlighting, projection, and
//! slice bounds. Every chain method borrows the current state and returns a
//! new one, so a base search can be branched freely:
//!
//! ```
//! use standout_search::{Kwargs, Search};
//!
//! let base = Search::new("fake").filter_kwargs(&Kwargs::new().arg("tag", "awesome")).unwrap();
//! let by_width = base.order_by(["-width"]);
//! let first_two = base.slice(..2);
//!
//! // The base is untouched by either branch.
//! assert!(base.orderings().is_empty());
//! assert_eq!(base.stop(), None);
//! assert_eq!(by_width.orderings().len(), 1);
//! assert_eq!(first_two.stop(), Some(2));
//! ```
//!
//! Nothing here talks to the engine. [`Search::compile`] renders the request
//! document and a [`Searcher`](crate::Searcher) executes it.

use std::ops::{Bound, RangeBounds};

use serde_json::{Map, Value};

use crate::clause::{Lookup, Predicate};
use crate::error::{Result, SearchError};
use crate::filter::{Filter, Kwarg, Kwargs};
use crate::op::Op;
use crate::ordering::OrderBy;
use crate::value::Number;

/// Field that is always part of a restricted projection.
pub const ID_FIELD: &str = "id";

/// Field searched by bare text when no query fields are configured.
pub const DEFAULT_QUERY_FIELD: &str = "_all";

/// A query clause as recorded by [`Search::query`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryClause {
    /// A single lookup (`fld1 = "qux"`, `title__text = "boof"`).
    Predicate(Predicate),
    /// Alternatives; at least one should match.
    AnyOf(Vec<QueryClause>),
    /// Bare text, expanded over the query fields when rendered.
    Text(String),
}

/// Arguments to [`Search::query`]: a bare text or keyword lookups.
///
/// Exactly one of the two must be supplied.
///
/// ```
/// use standout_search::{Kwargs, QueryArgs};
///
/// let text: QueryArgs = "qux".into();
/// let kw: QueryArgs = Kwargs::new().arg("fld1", "qux").into();
/// let both = QueryArgs::new().text("qux").kwargs(Kwargs::new().arg("fld1", "qux"));
/// # let _ = (text, kw, both);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryArgs {
    text: Option<String>,
    kwargs: Kwargs,
}

impl QueryArgs {
    /// Creates empty arguments.
    pub fn new() -> Self {
        QueryArgs::default()
    }

    /// Sets the bare text argument.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the keyword lookups.
    pub fn kwargs(mut self, kwargs: Kwargs) -> Self {
        self.kwargs = kwargs;
        self
    }
}

impl From<&str> for QueryArgs {
    fn from(text: &str) -> Self {
        QueryArgs::new().text(text)
    }
}

impl From<String> for QueryArgs {
    fn from(text: String) -> Self {
        QueryArgs::new().text(text)
    }
}

impl From<Kwargs> for QueryArgs {
    fn from(kwargs: Kwargs) -> Self {
        QueryArgs::new().kwargs(kwargs)
    }
}

/// Shape of each result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Hydrated entities looked up through a model store.
    #[default]
    Object,
    /// Mappings of field name to value.
    Dict(Vec<String>),
    /// Lists of field values in field order.
    List(Vec<String>),
}

/// Options for [`Search::highlight_with`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HighlightOptions {
    /// Text inserted before each highlighted portion.
    pub before_match: Option<String>,
    /// Text inserted after each highlighted portion.
    pub after_match: Option<String>,
    /// Fragment ordering; `"score"` unless set.
    pub order: String,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        HighlightOptions {
            before_match: None,
            after_match: None,
            order: "score".to_string(),
        }
    }
}

impl HighlightOptions {
    /// Sets the text inserted before each match.
    pub fn before_match(mut self, tag: impl Into<String>) -> Self {
        self.before_match = Some(tag.into());
        self
    }

    /// Sets the text inserted after each match.
    pub fn after_match(mut self, tag: impl Into<String>) -> Self {
        self.after_match = Some(tag.into());
        self
    }

    /// Sets the fragment ordering.
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }
}

/// Highlight configuration: the fields and how to mark matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Highlight {
    pub fields: Vec<String>,
    pub options: HighlightOptions,
}

/// An immutable, lazily executed search.
///
/// # Example
///
/// ```
/// use standout_search::{Kwargs, Search};
/// use serde_json::json;
///
/// let search = Search::new("fake")
///     .weight("fld1", 2).unwrap()
///     .query(Kwargs::new().arg("fld1", "qux")).unwrap();
///
/// assert_eq!(
///     search.build_query(),
///     json!({"query": {"term": {"fld1": {"value": "qux", "boost": 2}}}})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Search {
    doctype: String,
    index: Option<String>,
    queries: Vec<QueryClause>,
    filter: Option<Filter>,
    weights: Vec<(Lookup, Number)>,
    orderings: Vec<OrderBy>,
    facets: Map<String, Value>,
    highlight: Option<Highlight>,
    projection: Projection,
    query_fields: Vec<Lookup>,
    start: usize,
    stop: Option<usize>,
}

impl Search {
    /// Creates a search over documents of the given type.
    ///
    /// An empty search matches every document of that type.
    pub fn new(doctype: impl Into<String>) -> Self {
        Search {
            doctype: doctype.into(),
            index: None,
            queries: Vec::new(),
            filter: None,
            weights: Vec::new(),
            orderings: Vec::new(),
            facets: Map::new(),
            highlight: None,
            projection: Projection::Object,
            query_fields: Vec::new(),
            start: 0,
            stop: None,
        }
    }

    // ========================================================================
    // Targeting
    // ========================================================================

    /// Routes the search to an explicit index instead of the configured one.
    pub fn index(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.index = Some(name.into());
        next
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Adds query clauses.
    ///
    /// Pass either a bare text (searched across [`query_fields`](Self::query_fields))
    /// or keyword lookups. Keyword lookups must all match; an
    /// [`Kwargs::or`] group matches when any of its lookups do. Clauses from
    /// repeated calls accumulate.
    ///
    /// Fails with [`SearchError::InvalidQueryArguments`] when both or neither
    /// form is given.
    pub fn query(&self, args: impl Into<QueryArgs>) -> Result<Self> {
        let QueryArgs { text, kwargs } = args.into();
        let clauses = match (text, kwargs.is_empty()) {
            (Some(_), false) => {
                return Err(SearchError::InvalidQueryArguments(
                    "query() takes a bare text or keyword lookups, not both".to_string(),
                ))
            }
            (None, true) => {
                return Err(SearchError::InvalidQueryArguments(
                    "query() needs a bare text or keyword lookups".to_string(),
                ))
            }
            (Some(text), true) => vec![QueryClause::Text(text)],
            (None, false) => kwargs_to_clauses(&kwargs)?,
        };

        let mut next = self.clone();
        next.queries.extend(clauses);
        Ok(next)
    }

    /// Sets the fields searched by a bare-text query.
    ///
    /// Each entry is a lookup key such as `title` or `summary__text`. Only
    /// single-value operators make sense for text; `in` and range lookups
    /// are rejected.
    pub fn query_fields<I, S>(&self, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lookups = fields
            .into_iter()
            .map(|key| {
                let lookup = Lookup::parse(key.as_ref())?;
                match lookup.op {
                    Op::Term | Op::Text | Op::Prefix | Op::Fuzzy => Ok(lookup),
                    _ => Err(SearchError::InvalidLookupValue {
                        key: lookup.key(),
                        expected: "a text-compatible lookup",
                    }),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut next = self.clone();
        next.query_fields = lookups;
        Ok(next)
    }

    /// Sets the boost for a field, or a field with an operator.
    ///
    /// Weights apply at render time to query clauses with the same lookup,
    /// never to filters. A later weight for the same lookup replaces the
    /// earlier one.
    pub fn weight(&self, key: &str, boost: impl Into<Number>) -> Result<Self> {
        self.weights([(key, boost.into())])
    }

    /// Sets several boosts at once, in declaration order.
    pub fn weights<I, K, N>(&self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, N)>,
        K: AsRef<str>,
        N: Into<Number>,
    {
        let mut next = self.clone();
        for (key, boost) in pairs {
            let lookup = Lookup::parse(key.as_ref())?;
            let boost = boost.into();
            match next.weights.iter_mut().find(|(existing, _)| *existing == lookup) {
                Some(slot) => slot.1 = boost,
                None => next.weights.push((lookup, boost)),
            }
        }
        Ok(next)
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Adds a filter. Filters from repeated calls must all match.
    pub fn filter(&self, filter: impl Into<Filter>) -> Self {
        let mut next = self.clone();
        let filter = filter.into();
        next.filter = Some(match next.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        next
    }

    /// Adds keyword filters (sugar for ANDed predicates).
    pub fn filter_kwargs(&self, kwargs: &Kwargs) -> Result<Self> {
        Ok(match Filter::from_kwargs(kwargs)? {
            Some(filter) => self.filter(filter),
            None => self.clone(),
        })
    }

    // ========================================================================
    // Facets, ordering, highlighting
    // ========================================================================

    /// Adds a named facet. A later facet with the same name replaces it.
    ///
    /// The facet body is sent verbatim, e.g. `json!({"terms": {"field": "tag"}})`.
    pub fn facet(&self, name: impl Into<String>, spec: Value) -> Self {
        let mut next = self.clone();
        next.facets.insert(name.into(), spec);
        next
    }

    /// Adds several named facets at once.
    pub fn facet_kwargs<I, K>(&self, facets: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut next = self.clone();
        for (name, spec) in facets {
            next.facets.insert(name.into(), spec);
        }
        next
    }

    /// Replaces the sort order. Prefix a field with `-` to sort descending.
    pub fn order_by<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next = self.clone();
        next.orderings = fields
            .into_iter()
            .map(|f| OrderBy::parse(f.as_ref()))
            .collect();
        next
    }

    /// Highlights matches in the given fields with the engine's default
    /// markers, ordered by score.
    pub fn highlight<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight_with(fields, HighlightOptions::default())
    }

    /// Highlights matches in the given fields. Replaces any earlier highlight.
    pub fn highlight_with<I, S>(&self, fields: I, options: HighlightOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.highlight = Some(Highlight {
            fields: fields.into_iter().map(Into::into).collect(),
            options,
        });
        next
    }

    // ========================================================================
    // Projection
    // ========================================================================

    /// Returns results as lists of field values.
    ///
    /// `id` is always fetched; with no fields, only `id` is.
    pub fn values<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.projection = Projection::List(fields.into_iter().map(Into::into).collect());
        next
    }

    /// Returns results as field mappings.
    ///
    /// `id` is always fetched; with no fields, every field is.
    pub fn values_dict<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.projection = Projection::Dict(fields.into_iter().map(Into::into).collect());
        next
    }

    // ========================================================================
    // Slicing
    // ========================================================================

    /// Narrows the search to a window of results.
    ///
    /// The range is relative to any earlier slice, so `s.slice(2..).slice(..3)`
    /// fetches results 2, 3 and 4.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let offset = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&n) => Some(self.start.saturating_add(n).saturating_add(1)),
            Bound::Excluded(&n) => Some(self.start.saturating_add(n)),
            Bound::Unbounded => None,
        };

        let mut next = self.clone();
        next.start = self.start.saturating_add(offset);
        next.stop = match (end, self.stop) {
            (Some(end), Some(stop)) => Some(end.min(stop)),
            (end, stop) => end.or(stop),
        };
        if let Some(stop) = next.stop {
            next.start = next.start.min(stop);
        }
        next
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the document type being searched.
    pub fn doctype(&self) -> &str {
        &self.doctype
    }

    /// Returns the explicit index, if one was set.
    pub fn index_override(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Returns the recorded query clauses.
    pub fn query_clauses(&self) -> &[QueryClause] {
        &self.queries
    }

    /// Returns the accumulated filter tree.
    pub fn filter_tree(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Returns the weights in declaration order.
    pub fn weight_list(&self) -> &[(Lookup, Number)] {
        &self.weights
    }

    /// Returns the boost for a lookup, if one was set.
    pub fn weight_for(&self, lookup: &Lookup) -> Option<Number> {
        self.weights
            .iter()
            .find(|(l, _)| l == lookup)
            .map(|(_, boost)| *boost)
    }

    /// Returns the sort order.
    pub fn orderings(&self) -> &[OrderBy] {
        &self.orderings
    }

    /// Returns the facet specs.
    pub fn facet_specs(&self) -> &Map<String, Value> {
        &self.facets
    }

    /// Returns the highlight configuration.
    pub fn highlight_spec(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    /// Returns the projection mode.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Returns the configured query fields.
    pub fn query_field_list(&self) -> &[Lookup] {
        &self.query_fields
    }

    /// Returns the index of the first result to fetch.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the exclusive end of the slice, if any.
    pub fn stop(&self) -> Option<usize> {
        self.stop
    }

    /// Returns the fields to request, or `None` to fetch whole documents.
    ///
    /// `id` appears exactly once in any restricted list.
    pub fn field_list(&self) -> Option<Vec<String>> {
        let requested = match &self.projection {
            Projection::Object => return None,
            Projection::Dict(fields) if fields.is_empty() => return None,
            Projection::Dict(fields) | Projection::List(fields) => fields,
        };

        let mut fields: Vec<String> = Vec::with_capacity(requested.len() + 1);
        for field in requested {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }
        if !fields.iter().any(|f| f == ID_FIELD) {
            fields.push(ID_FIELD.to_string());
        }
        Some(fields)
    }
}

fn kwargs_to_clauses(kwargs: &Kwargs) -> Result<Vec<QueryClause>> {
    let mut clauses = Vec::with_capacity(kwargs.len());
    for entry in kwargs.entries() {
        match entry {
            Kwarg::Lookup(key, value) => {
                clauses.push(QueryClause::Predicate(Predicate::lookup(key, value.clone())?))
            }
            Kwarg::Or(group) => {
                let alternatives = kwargs_to_clauses(group)?;
                if !alternatives.is_empty() {
                    clauses.push(QueryClause::AnyOf(alternatives));
                }
            }
        }
    }
    Ok(clauses)
}
