//! Request compilation.
//!
//! [`Search::compile`] turns builder state into a [`CompiledRequest`], the
//! document handed to the transport. Compilation is pure: the same state
//! always yields the same document, and a key appears only when the part of
//! the state it reflects is non-empty.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::clause::{Lookup, Predicate};
use crate::op::Op;
use crate::query::{Highlight, QueryClause, Search, DEFAULT_QUERY_FIELD};
use crate::value::Term;

/// A rendered search request.
///
/// ```text
/// {
///   "query":     <clause>,
///   "filter":    <clause>,
///   "fields":    [<field>, ...],
///   "facets":    {<name>: <spec>, ...},
///   "highlight": {"fields": {<field>: {}}, "pre_tags": [..], "post_tags": [..], "order": "score"},
///   "sort":      [{<field>: "asc" | "desc"}, ...],
///   "from":      <offset>,
///   "size":      <count>
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl CompiledRequest {
    /// Returns the request as a JSON document, keys in canonical order.
    pub fn to_value(&self) -> Value {
        let mut doc = Map::new();
        if let Some(query) = &self.query {
            doc.insert("query".to_string(), query.clone());
        }
        if let Some(filter) = &self.filter {
            doc.insert("filter".to_string(), filter.clone());
        }
        if let Some(fields) = &self.fields {
            doc.insert("fields".to_string(), json!(fields));
        }
        if let Some(facets) = &self.facets {
            doc.insert("facets".to_string(), Value::Object(facets.clone()));
        }
        if let Some(highlight) = &self.highlight {
            doc.insert("highlight".to_string(), highlight.clone());
        }
        if let Some(sort) = &self.sort {
            doc.insert("sort".to_string(), Value::Array(sort.clone()));
        }
        if let Some(from) = self.from {
            doc.insert("from".to_string(), json!(from));
        }
        if let Some(size) = self.size {
            doc.insert("size".to_string(), json!(size));
        }
        Value::Object(doc)
    }
}

impl Search {
    /// Renders this search into a request.
    pub fn compile(&self) -> CompiledRequest {
        let query = self.render_queries();
        let filter = self.filter_tree().map(|f| f.render());
        let facets = (!self.facet_specs().is_empty()).then(|| self.facet_specs().clone());
        let highlight = self.highlight_spec().map(render_highlight);
        let sort = (!self.orderings().is_empty())
            .then(|| self.orderings().iter().map(|o| o.render()).collect());
        let from = (self.start() > 0).then_some(self.start());
        let size = self.stop().map(|stop| stop.saturating_sub(self.start()));

        CompiledRequest {
            query,
            filter,
            fields: self.field_list(),
            facets,
            highlight,
            sort,
            from,
            size,
        }
    }

    /// Renders this search into a JSON request document.
    pub fn build_query(&self) -> Value {
        self.compile().to_value()
    }

    fn render_queries(&self) -> Option<Value> {
        let mut rendered: Vec<Value> = self
            .query_clauses()
            .iter()
            .map(|clause| self.render_clause(clause))
            .collect();
        match rendered.len() {
            0 => None,
            1 => rendered.pop(),
            _ => Some(json!({ "bool": { "must": rendered } })),
        }
    }

    fn render_clause(&self, clause: &QueryClause) -> Value {
        match clause {
            QueryClause::Predicate(pred) => pred.render_query(self.weight_for(&pred.as_lookup())),
            QueryClause::AnyOf(alternatives) => {
                let rendered = alternatives.iter().map(|c| self.render_clause(c)).collect();
                any_of(rendered)
            }
            QueryClause::Text(text) => {
                let default_fields = [Lookup::new(DEFAULT_QUERY_FIELD, Op::Text)];
                let fields = if self.query_field_list().is_empty() {
                    &default_fields[..]
                } else {
                    self.query_field_list()
                };
                let rendered = fields
                    .iter()
                    .map(|lookup| {
                        let pred = Predicate {
                            field: lookup.field.clone(),
                            op: lookup.op,
                            value: Term::Str(text.clone()),
                        };
                        pred.render_query(self.weight_for(lookup))
                    })
                    .collect();
                any_of(rendered)
            }
        }
    }
}

/// Wraps alternatives in a `bool.should`; a lone alternative stands alone.
fn any_of(mut alternatives: Vec<Value>) -> Value {
    if alternatives.len() == 1 {
        return alternatives.remove(0);
    }
    json!({ "bool": { "should": alternatives } })
}

fn render_highlight(highlight: &Highlight) -> Value {
    let fields: Map<String, Value> = highlight
        .fields
        .iter()
        .map(|f| (f.clone(), json!({})))
        .collect();

    let mut doc = Map::new();
    doc.insert("fields".to_string(), Value::Object(fields));
    if let Some(before) = &highlight.options.before_match {
        doc.insert("pre_tags".to_string(), json!([before]));
    }
    if let Some(after) = &highlight.options.after_match {
        doc.insert("post_tags".to_string(), json!([after]));
    }
    doc.insert("order".to_string(), json!(highlight.options.order));
    Value::Object(doc)
}
