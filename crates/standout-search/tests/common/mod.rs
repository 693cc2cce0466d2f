//! An in-memory engine that interprets compiled requests.
//!
//! Analysis is deliberately simple: string values are lowercased and split on
//! whitespace, numbers compare numerically. That is enough to exercise
//! filters, queries, sorting, slicing, projection, highlighting, facets, and
//! more-like-this the way a real engine would answer them.

#![allow(dead_code)]

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use standout_search::{
    Document, Hits, RawHit, Result, ResultEnvelope, SearchConfig, SearchError, Searcher,
    Transport,
};

pub const INDEX: &str = "test";
pub const DOCTYPE: &str = "fake";

/// The five documents most tests search over.
pub fn fixture() -> Vec<Value> {
    vec![
        json!({"id": 1, "foo": "bar", "tag": "awesome", "width": 2}),
        json!({"id": 2, "foo": "barf", "tag": "boring", "width": 7}),
        json!({"id": 3, "foo": "car", "tag": "awesome", "width": 5}),
        json!({"id": 4, "foo": "duck", "tag": "boat", "width": 11}),
        json!({"id": 5, "foo": "train car", "tag": "awesome", "width": 7}),
    ]
}

/// Documents for similarity searches.
pub fn mlt_fixture() -> Vec<Value> {
    vec![
        json!({"id": 1, "foo": "bar", "tag": "awesome"}),
        json!({"id": 2, "foo": "bar", "tag": "boring"}),
        json!({"id": 3, "foo": "bar", "tag": "awesome"}),
        json!({"id": 4, "foo": "bar", "tag": "boring"}),
        json!({"id": 5, "foo": "bar", "tag": "elite"}),
        json!({"id": 6, "foo": "notbar", "tag": "gross"}),
        json!({"id": 7, "foo": "notbar", "tag": "awesome"}),
    ]
}

/// A searcher over the main fixture, routed to [`INDEX`].
pub fn searcher() -> Searcher<MemoryEngine> {
    let engine = MemoryEngine::new();
    engine.load(INDEX, DOCTYPE, fixture());
    Searcher::new(engine, SearchConfig::with_default_index(INDEX))
}

/// A searcher over the similarity fixture.
pub fn mlt_searcher() -> Searcher<MemoryEngine> {
    let engine = MemoryEngine::new();
    engine.load(INDEX, DOCTYPE, mlt_fixture());
    Searcher::new(engine, SearchConfig::with_default_index(INDEX))
}

struct Stored {
    id: String,
    doctype: String,
    doc: Document,
}

#[derive(Default)]
pub struct MemoryEngine {
    indexes: RefCell<BTreeMap<String, Vec<Stored>>>,
    requests: RefCell<Vec<Value>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        MemoryEngine::default()
    }

    /// Stores `docs` under `index`; each document's `id` becomes its hit id.
    pub fn load(&self, index: &str, doctype: &str, docs: Vec<Value>) {
        let mut indexes = self.indexes.borrow_mut();
        let stored = indexes.entry(index.to_string()).or_default();
        for doc in docs {
            let doc = doc.as_object().cloned().unwrap_or_default();
            let id = doc.get("id").map(display).unwrap_or_default();
            stored.push(Stored {
                id,
                doctype: doctype.to_string(),
                doc,
            });
        }
    }

    /// Every request body received, in order.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn respond(&self, request: &Value, candidates: Vec<&Stored>) -> ResultEnvelope {
        let query = request.get("query");
        let filter = request.get("filter");

        let queried: Vec<(&Stored, f64)> = candidates
            .into_iter()
            .filter_map(|stored| match query {
                Some(q) => score(&stored.doc, q).map(|s| (stored, s)),
                None => Some((stored, 1.0)),
            })
            .collect();

        let facets = request
            .get("facets")
            .and_then(Value::as_object)
            .map(|specs| facet_counts(specs, &queried))
            .unwrap_or_default();

        let mut matched: Vec<(&Stored, f64)> = queried
            .into_iter()
            .filter(|(stored, _)| filter.map_or(true, |f| matches(&stored.doc, f)))
            .collect();

        match request.get("sort").and_then(Value::as_array) {
            Some(sort) => matched.sort_by(|a, b| compare_by(sort, &a.0.doc, &b.0.doc)),
            None => matched.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal)),
        }

        let total = matched.len() as u64;
        let from = request.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
        let size = request
            .get("size")
            .and_then(Value::as_u64)
            .map_or(matched.len(), |s| s as usize);

        let fields: Option<Vec<String>> = request.get("fields").and_then(Value::as_array).map(|f| {
            f.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        });
        let terms = query.map(query_terms).unwrap_or_default();

        let hits = matched
            .into_iter()
            .skip(from)
            .take(size)
            .map(|(stored, score)| RawHit {
                id: stored.id.clone(),
                score: Some(score),
                doc_type: Some(stored.doctype.clone()),
                source: fields.is_none().then(|| stored.doc.clone()),
                fields: fields.as_ref().map(|fields| {
                    fields
                        .iter()
                        .filter_map(|f| stored.doc.get(f).map(|v| (f.clone(), v.clone())))
                        .collect()
                }),
                highlight: request
                    .get("highlight")
                    .map(|spec| highlight(&stored.doc, spec, &terms)),
            })
            .collect();

        ResultEnvelope {
            took: 1,
            hits: Hits { total, hits },
            facets,
        }
    }
}

impl Transport for MemoryEngine {
    fn search(&self, request: &Value, index: &str, doctype: &str) -> Result<ResultEnvelope> {
        self.requests.borrow_mut().push(request.clone());
        let indexes = self.indexes.borrow();
        let docs = indexes
            .get(index)
            .ok_or_else(|| SearchError::IndexMissing(index.to_string()))?;
        let candidates = docs.iter().filter(|s| s.doctype == doctype).collect();
        Ok(self.respond(request, candidates))
    }

    fn more_like_this(
        &self,
        index: &str,
        doctype: &str,
        id: &str,
        params: &Map<String, Value>,
        body: &Value,
    ) -> Result<ResultEnvelope> {
        self.requests.borrow_mut().push(body.clone());
        let indexes = self.indexes.borrow();
        let docs = indexes
            .get(index)
            .ok_or_else(|| SearchError::IndexMissing(index.to_string()))?;
        let source = docs
            .iter()
            .find(|s| s.id == id && s.doctype == doctype)
            .ok_or_else(|| SearchError::Transport(format!("document {} not found", id)))?;

        let mlt_fields: Vec<&str> = params
            .get("mlt_fields")
            .and_then(Value::as_str)
            .map(|f| f.split(',').collect())
            .unwrap_or_default();

        let candidates = docs
            .iter()
            .filter(|s| s.doctype == doctype && s.id != id)
            .filter(|s| {
                mlt_fields.iter().any(|field| {
                    let wanted = source.doc.get(*field).map(tokens).unwrap_or_default();
                    let have = s.doc.get(*field).map(tokens).unwrap_or_default();
                    wanted.iter().any(|t| have.contains(t))
                })
            })
            .collect();
        Ok(self.respond(body, candidates))
    }

    fn refresh(&self, index: &str) -> Result<()> {
        if self.indexes.borrow().contains_key(index) {
            Ok(())
        } else {
            Err(SearchError::IndexMissing(index.to_string()))
        }
    }

    fn delete_index(&self, index: &str) -> Result<()> {
        self.indexes
            .borrow_mut()
            .remove(index)
            .map(|_| ())
            .ok_or_else(|| SearchError::IndexMissing(index.to_string()))
    }
}

// ============================================================================
// Analysis
// ============================================================================

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn tokens(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s.split_whitespace().map(str::to_lowercase).collect(),
        Value::Array(items) => items.iter().flat_map(tokens).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y),
        _ => match (a, b) {
            (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
            _ => None,
        },
    }
}

fn term_matches(have: &Value, wanted: &Value) -> bool {
    if compare_values(have, wanted) == Some(Ordering::Equal) {
        return true;
    }
    match wanted {
        Value::String(w) => tokens(have).contains(&w.to_lowercase()),
        other => have == other,
    }
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let current = row[j + 1];
            row[j + 1] = if ca == *cb {
                prev
            } else {
                1 + prev.min(row[j]).min(row[j + 1])
            };
            prev = current;
        }
    }
    row[b.len()]
}

// ============================================================================
// Clause interpretation
// ============================================================================

fn single_entry(clause: &Value) -> Option<(&str, &Value)> {
    clause
        .as_object()
        .and_then(|m| m.iter().next())
        .map(|(k, v)| (k.as_str(), v))
}

/// Splits a `{field: value}` or `{field: {value|query: v, boost: b}}` body.
fn field_and_needle(body: &Value) -> Option<(&str, &Value, f64)> {
    let (field, raw) = single_entry(body)?;
    match raw.as_object() {
        Some(options) if options.contains_key("value") || options.contains_key("query") => {
            let needle = options.get("value").or_else(|| options.get("query"))?;
            let boost = options.get("boost").and_then(numeric).unwrap_or(1.0);
            Some((field, needle, boost))
        }
        _ => Some((field, raw, 1.0)),
    }
}

fn field_values<'d>(doc: &'d Document, field: &str) -> Vec<&'d Value> {
    if field == "_all" {
        doc.values().collect()
    } else {
        doc.get(field).into_iter().collect()
    }
}

/// Returns the boost of a matching leaf clause, or `None` when it misses.
fn leaf(doc: &Document, kind: &str, body: &Value) -> Option<f64> {
    match kind {
        "term" | "text" | "prefix" | "fuzzy" => {
            let (field, needle, boost) = field_and_needle(body)?;
            let values = field_values(doc, field);
            let hit = values.iter().any(|have| match kind {
                "term" => term_matches(have, needle),
                "text" => {
                    let wanted = tokens(needle);
                    let have = tokens(have);
                    wanted.iter().any(|t| have.contains(t))
                }
                "prefix" => {
                    let prefix = display(needle).to_lowercase();
                    tokens(have).iter().any(|t| t.starts_with(&prefix))
                }
                _ => {
                    let wanted = display(needle).to_lowercase();
                    tokens(have).iter().any(|t| edit_distance(t, &wanted) <= 2)
                }
            });
            hit.then_some(boost)
        }
        "terms" => {
            let body = body.as_object()?;
            let boost = body.get("boost").and_then(numeric).unwrap_or(1.0);
            let (field, wanted) = body.iter().find(|(k, _)| k.as_str() != "boost")?;
            let wanted = wanted.as_array()?;
            let hit = field_values(doc, field)
                .iter()
                .any(|have| wanted.iter().any(|w| term_matches(have, w)));
            hit.then_some(boost)
        }
        "range" => {
            let (field, bounds) = single_entry(body)?;
            let bounds = bounds.as_object()?;
            let have = doc.get(field)?;
            let boost = bounds.get("boost").and_then(numeric).unwrap_or(1.0);
            let within = bounds.iter().all(|(op, bound)| {
                let ord = compare_values(have, bound);
                match op.as_str() {
                    "gt" => ord == Some(Ordering::Greater),
                    "gte" => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
                    "lt" => ord == Some(Ordering::Less),
                    "lte" => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
                    _ => true,
                }
            });
            within.then_some(boost)
        }
        _ => None,
    }
}

/// Scores a document against a query clause; `None` means no match.
fn score(doc: &Document, clause: &Value) -> Option<f64> {
    let (kind, body) = single_entry(clause)?;
    if kind != "bool" {
        return leaf(doc, kind, body);
    }
    let mut total = 0.0;
    if let Some(must) = body.get("must").and_then(Value::as_array) {
        for clause in must {
            total += score(doc, clause)?;
        }
    }
    if let Some(should) = body.get("should").and_then(Value::as_array) {
        let scores: Vec<f64> = should.iter().filter_map(|c| score(doc, c)).collect();
        if scores.is_empty() {
            return None;
        }
        total += scores.iter().sum::<f64>();
    }
    Some(total)
}

/// Decides whether a document passes a filter clause.
fn matches(doc: &Document, clause: &Value) -> bool {
    let Some((kind, body)) = single_entry(clause) else {
        return false;
    };
    match kind {
        "bool" => {
            let must = body
                .get("must")
                .and_then(Value::as_array)
                .map_or(true, |all| all.iter().all(|c| matches(doc, c)));
            let should = body
                .get("should")
                .and_then(Value::as_array)
                .map_or(true, |any| any.iter().any(|c| matches(doc, c)));
            must && should
        }
        "not" => body.get("filter").map_or(true, |inner| !matches(doc, inner)),
        "query" => score(doc, body).is_some(),
        _ => leaf(doc, kind, body).is_some(),
    }
}

fn compare_by(sort: &[Value], a: &Document, b: &Document) -> Ordering {
    for entry in sort {
        let Some((field, dir)) = single_entry(entry) else {
            continue;
        };
        let ord = match (a.get(field), b.get(field)) {
            (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ord = if dir.as_str() == Some("desc") {
            ord.reverse()
        } else {
            ord
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

// ============================================================================
// Highlighting and facets
// ============================================================================

/// Collects the lowercased search terms of every text-like query leaf,
/// keyed by field.
fn query_terms(query: &Value) -> BTreeMap<String, Vec<String>> {
    let mut terms: BTreeMap<String, Vec<String>> = BTreeMap::new();
    collect_terms(query, &mut terms);
    terms
}

fn collect_terms(clause: &Value, terms: &mut BTreeMap<String, Vec<String>>) {
    let Some((kind, body)) = single_entry(clause) else {
        return;
    };
    match kind {
        "bool" => {
            for key in ["must", "should"] {
                for inner in body.get(key).and_then(Value::as_array).into_iter().flatten() {
                    collect_terms(inner, terms);
                }
            }
        }
        "term" | "text" | "prefix" | "fuzzy" => {
            if let Some((field, needle, _)) = field_and_needle(body) {
                terms
                    .entry(field.to_string())
                    .or_default()
                    .extend(tokens(needle));
            }
        }
        _ => {}
    }
}

fn highlight(
    doc: &Document,
    spec: &Value,
    terms: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, Vec<String>> {
    let tag = |key: &str, default: &str| {
        spec.get(key)
            .and_then(Value::as_array)
            .and_then(|tags| tags.first())
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    };
    let pre = tag("pre_tags", "<em>");
    let post = tag("post_tags", "</em>");

    let mut fragments = BTreeMap::new();
    let fields = spec.get("fields").and_then(Value::as_object);
    for field in fields.into_iter().flat_map(|f| f.keys()) {
        let wanted: Vec<&String> = terms
            .get(field)
            .into_iter()
            .chain(terms.get("_all"))
            .flatten()
            .collect();
        let Some(text) = doc.get(field).and_then(Value::as_str) else {
            continue;
        };
        let mut marked = false;
        let words: Vec<String> = text
            .split_whitespace()
            .map(|word| {
                if wanted.iter().any(|w| **w == word.to_lowercase()) {
                    marked = true;
                    format!("{}{}{}", pre, word, post)
                } else {
                    word.to_string()
                }
            })
            .collect();
        if marked {
            fragments.insert(field.clone(), vec![words.join(" ")]);
        }
    }
    fragments
}

fn facet_counts(specs: &Map<String, Value>, docs: &[(&Stored, f64)]) -> Map<String, Value> {
    let mut out = Map::new();
    for (name, spec) in specs {
        let scoped: Vec<&Document> = docs
            .iter()
            .map(|(stored, _)| &stored.doc)
            .filter(|doc| spec.get("facet_filter").map_or(true, |f| matches(doc, f)))
            .collect();

        if let Some(field) = spec.pointer("/terms/field").and_then(Value::as_str) {
            let mut counts: BTreeMap<String, u64> = BTreeMap::new();
            for doc in &scoped {
                if let Some(value) = doc.get(field) {
                    *counts.entry(display(value)).or_default() += 1;
                }
            }
            let mut buckets: Vec<(String, u64)> = counts.into_iter().collect();
            buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            let terms: Vec<Value> = buckets
                .into_iter()
                .map(|(term, count)| json!({"term": term, "count": count}))
                .collect();
            out.insert(name.clone(), json!({"_type": "terms", "terms": terms}));
        } else if let Some(field) = spec.pointer("/range/field").and_then(Value::as_str) {
            let ranges: Vec<Value> = spec
                .pointer("/range/ranges")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .map(|range| {
                    let count = scoped
                        .iter()
                        .filter_map(|doc| doc.get(field).and_then(numeric))
                        .filter(|v| {
                            range.get("from").and_then(numeric).map_or(true, |from| *v >= from)
                                && range.get("to").and_then(numeric).map_or(true, |to| *v < to)
                        })
                        .count();
                    let mut bucket = range.as_object().cloned().unwrap_or_default();
                    bucket.insert("count".to_string(), json!(count));
                    Value::Object(bucket)
                })
                .collect();
            out.insert(name.clone(), json!({"_type": "range", "ranges": ranges}));
        }
    }
    out
}
