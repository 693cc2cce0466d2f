//! Boolean filter expressions.
//!
//! A [`Filter`] is an immutable tree: predicates at the leaves, AND/OR/NOT
//! above them. Combining two filters always builds a new tree and never
//! touches its operands, so a filter can be reused in as many searches as
//! needed. Trees compare and hash structurally.
//!
//! # Rendering
//!
//! ```text
//! Predicate      -> native clause (term, terms, range, prefix, ...)
//! And(a, And(b, c)) -> {"bool": {"must":   [a, b, c]}}   (flattened)
//! Or(a, Or(b, c))   -> {"bool": {"should": [a, b, c]}}   (flattened)
//! Not(a)         -> {"not": {"filter": a}}               (never simplified)
//! ```

use serde_json::{json, Value};

use crate::clause::Predicate;
use crate::error::Result;
use crate::op::Op;
use crate::value::Term;

/// Boolean filter tree.
///
/// # Example
///
/// ```
/// use standout_search::Filter;
/// use serde_json::json;
///
/// let awesome = Filter::lookup("tag", "awesome").unwrap();
/// let boat = Filter::lookup("tag", "boat").unwrap();
///
/// let either = Filter::or(awesome.clone(), boat);
/// assert_eq!(
///     either.render(),
///     json!({"bool": {"should": [
///         {"term": {"tag": "awesome"}},
///         {"term": {"tag": "boat"}}
///     ]}})
/// );
///
/// // Operands are untouched.
/// assert_eq!(awesome.render(), json!({"term": {"tag": "awesome"}}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Single-field predicate.
    Predicate(Predicate),
    /// Both sides must match.
    And(Box<Filter>, Box<Filter>),
    /// At least one side must match.
    Or(Box<Filter>, Box<Filter>),
    /// The child must not match.
    Not(Box<Filter>),
}

impl Filter {
    /// Builds a leaf from a field, an operator suffix, and a value.
    ///
    /// Pass an empty suffix for an exact term match.
    /// The field is taken as given, so it may itself contain `__`.
    pub fn predicate(field: &str, suffix: &str, value: impl Into<Term>) -> Result<Filter> {
        let op = Op::from_suffix(field, (!suffix.is_empty()).then_some(suffix))?;
        Ok(Filter::Predicate(Predicate::new(field, op, value)?))
    }

    /// Builds a leaf from a lookup key such as `tag` or `width__gte`.
    pub fn lookup(key: &str, value: impl Into<Term>) -> Result<Filter> {
        Ok(Filter::Predicate(Predicate::lookup(key, value)?))
    }

    /// Combines two filters; both must match.
    pub fn and(self, other: Filter) -> Filter {
        Filter::And(Box::new(self), Box::new(other))
    }

    /// Combines two filters; at least one must match.
    pub fn or(self, other: Filter) -> Filter {
        Filter::Or(Box::new(self), Box::new(other))
    }

    /// Negates a filter.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }

    /// Builds a filter from keyword lookups.
    ///
    /// Top-level entries AND together; each [`Kwargs::or`] group ORs its own
    /// entries. Returns `None` when there is nothing to filter on.
    pub fn from_kwargs(kwargs: &Kwargs) -> Result<Option<Filter>> {
        kwargs.fold(Filter::and)
    }

    /// Renders this tree as a filter clause.
    pub fn render(&self) -> Value {
        match self {
            Filter::Predicate(pred) => pred.render_filter(),
            Filter::And(..) => {
                let mut operands = Vec::new();
                self.flatten_and(&mut operands);
                json!({ "bool": { "must": render_all(&operands) } })
            }
            Filter::Or(..) => {
                let mut operands = Vec::new();
                self.flatten_or(&mut operands);
                json!({ "bool": { "should": render_all(&operands) } })
            }
            Filter::Not(child) => json!({ "not": { "filter": child.render() } }),
        }
    }

    fn flatten_and<'a>(&'a self, out: &mut Vec<&'a Filter>) {
        match self {
            Filter::And(left, right) => {
                left.flatten_and(out);
                right.flatten_and(out);
            }
            other => out.push(other),
        }
    }

    fn flatten_or<'a>(&'a self, out: &mut Vec<&'a Filter>) {
        match self {
            Filter::Or(left, right) => {
                left.flatten_or(out);
                right.flatten_or(out);
            }
            other => out.push(other),
        }
    }
}

impl From<Predicate> for Filter {
    fn from(pred: Predicate) -> Self {
        Filter::Predicate(pred)
    }
}

fn render_all(filters: &[&Filter]) -> Vec<Value> {
    filters.iter().map(|f| f.render()).collect()
}

/// Ordered keyword lookups, the builder-side stand-in for keyword arguments.
///
/// ```
/// use standout_search::Kwargs;
///
/// // tag = awesome AND (foo = bar OR width = 5)
/// let kw = Kwargs::new()
///     .arg("tag", "awesome")
///     .or(Kwargs::new().arg("foo", "bar").arg("width", 5));
/// assert_eq!(kw.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kwargs {
    entries: Vec<Kwarg>,
}

/// One keyword entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Kwarg {
    /// A `key = value` lookup.
    Lookup(String, Term),
    /// A group whose entries are ORed together.
    Or(Kwargs),
}

impl Kwargs {
    /// Creates an empty set of keyword lookups.
    pub fn new() -> Self {
        Kwargs::default()
    }

    /// Adds a `key = value` lookup.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Term>) -> Self {
        self.entries.push(Kwarg::Lookup(key.into(), value.into()));
        self
    }

    /// Adds a group of lookups combined with OR.
    pub fn or(mut self, group: Kwargs) -> Self {
        self.entries.push(Kwarg::Or(group));
        self
    }

    /// Returns the entries in declaration order.
    pub fn entries(&self) -> &[Kwarg] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folds the entries into one filter with `combine`; OR groups always
    /// fold with OR.
    fn fold(&self, combine: fn(Filter, Filter) -> Filter) -> Result<Option<Filter>> {
        let mut acc: Option<Filter> = None;
        for entry in &self.entries {
            let next = match entry {
                Kwarg::Lookup(key, value) => Some(Filter::lookup(key, value.clone())?),
                Kwarg::Or(group) => group.fold(Filter::or)?,
            };
            acc = match (acc, next) {
                (Some(left), Some(right)) => Some(combine(left, right)),
                (left, right) => left.or(right),
            };
        }
        Ok(acc)
    }
}

impl<K: Into<String>, V: Into<Term>> FromIterator<(K, V)> for Kwargs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Kwargs::new(), |kw, (key, value)| kw.arg(key, value))
    }
}
