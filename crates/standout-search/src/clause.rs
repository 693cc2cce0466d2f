//! Single-field predicates and how they render.
//!
//! A [`Predicate`] is a field name, an [`Op`], and a [`Term`]. It is the leaf
//! of every filter tree and of every query clause. Predicates are validated
//! when constructed: an unknown suffix or a value that does not fit the
//! operator fails right there, long before anything is sent to the engine.

use serde_json::{json, Map, Value};

use crate::error::{Result, SearchError};
use crate::op::Op;
use crate::value::{Number, Term};

/// A parsed lookup key: `field` or `field__suffix`.
///
/// The key is split at the last `__`, so field names may themselves contain
/// double underscores as long as the final segment is a known suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lookup {
    /// Field name.
    pub field: String,
    /// Operator selected by the suffix.
    pub op: Op,
}

impl Lookup {
    /// Parses a lookup key.
    ///
    /// ```
    /// use standout_search::{Lookup, Op};
    ///
    /// let lookup = Lookup::parse("summary__text").unwrap();
    /// assert_eq!(lookup.field, "summary");
    /// assert_eq!(lookup.op, Op::Text);
    ///
    /// assert!(Lookup::parse("summary__frob").is_err());
    /// ```
    pub fn parse(key: &str) -> Result<Lookup> {
        let (field, suffix) = split_key(key);
        let op = Op::from_suffix(field, suffix)?;
        Ok(Lookup {
            field: field.to_string(),
            op,
        })
    }

    /// Creates a lookup from its parts.
    pub fn new(field: impl Into<String>, op: Op) -> Self {
        Lookup {
            field: field.into(),
            op,
        }
    }

    /// Returns the canonical key (`field` or `field__suffix`).
    pub fn key(&self) -> String {
        match self.op.suffix() {
            Some(suffix) => format!("{}__{}", self.field, suffix),
            None => self.field.clone(),
        }
    }
}

/// Splits `field__suffix` at the last `__`.
pub(crate) fn split_key(key: &str) -> (&str, Option<&str>) {
    match key.rsplit_once("__") {
        Some((field, suffix)) => (field, Some(suffix)),
        None => (key, None),
    }
}

/// A single filter or query predicate.
///
/// # Example
///
/// ```
/// use standout_search::{Op, Predicate};
/// use serde_json::json;
///
/// let pred = Predicate::lookup("width__gte", 5).unwrap();
/// assert_eq!(pred.op, Op::Gte);
/// assert_eq!(pred.render_filter(), json!({"range": {"width": {"gte": 5}}}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    pub op: Op,
    /// The value to compare against.
    pub value: Term,
}

impl Predicate {
    /// Creates a predicate, checking that the value fits the operator.
    pub fn new(field: impl Into<String>, op: Op, value: impl Into<Term>) -> Result<Self> {
        let pred = Predicate {
            field: field.into(),
            op,
            value: value.into(),
        };
        pred.validate()?;
        Ok(pred)
    }

    /// Creates a predicate from a lookup key such as `tag` or `width__lt`.
    pub fn lookup(key: &str, value: impl Into<Term>) -> Result<Self> {
        let Lookup { field, op } = Lookup::parse(key)?;
        Predicate::new(field, op, value)
    }

    /// Returns the lookup this predicate was built from.
    pub fn as_lookup(&self) -> Lookup {
        Lookup::new(self.field.clone(), self.op)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |expected| SearchError::InvalidLookupValue {
            key: self.as_lookup().key(),
            expected,
        };
        match self.op {
            Op::In if self.value.as_list().is_none() => Err(invalid("a list of values")),
            Op::Range => match self.value.as_list() {
                Some([_, _]) => Ok(()),
                _ => Err(invalid("a [low, high] pair")),
            },
            Op::Gt | Op::Gte | Op::Lt | Op::Lte | Op::Term | Op::Text | Op::Prefix | Op::Fuzzy
                if self.value.as_list().is_some() =>
            {
                Err(invalid("a single value"))
            }
            _ => Ok(()),
        }
    }

    /// Range bounds for range-shaped operators.
    fn bounds(&self) -> Map<String, Value> {
        let mut bounds = Map::new();
        if let Some(bound) = self.op.range_bound() {
            bounds.insert(bound.to_string(), self.value.to_json());
        } else if let Some([low, high]) = self.value.as_list() {
            bounds.insert("gte".to_string(), low.to_json());
            bounds.insert("lte".to_string(), high.to_json());
        }
        bounds
    }

    /// Renders this predicate as a filter clause.
    ///
    /// Full-text lookups have no native filter form, so they are wrapped in
    /// a `query` filter.
    pub fn render_filter(&self) -> Value {
        match self.op {
            Op::Text => json!({ "query": self.render_query(None) }),
            _ => self.render_query(None),
        }
    }

    /// Renders this predicate as a query clause, optionally boosted.
    pub fn render_query(&self, boost: Option<Number>) -> Value {
        let kind = self.op.clause_kind().as_str();
        let body = match self.op {
            Op::Range | Op::Gt | Op::Gte | Op::Lt | Op::Lte => {
                let mut bounds = self.bounds();
                if let Some(boost) = boost {
                    bounds.insert("boost".to_string(), boost.to_json());
                }
                single(&self.field, Value::Object(bounds))
            }
            Op::In => {
                let mut body = single(&self.field, self.value.to_json());
                if let Some(boost) = boost {
                    body.insert("boost".to_string(), boost.to_json());
                }
                body
            }
            Op::Term | Op::Text | Op::Prefix | Op::Fuzzy => match boost {
                Some(boost) => {
                    let mut options = Map::new();
                    options.insert(self.op.value_key().to_string(), self.value.to_json());
                    options.insert("boost".to_string(), boost.to_json());
                    single(&self.field, Value::Object(options))
                }
                None => single(&self.field, self.value.to_json()),
            },
        };
        Value::Object(single(kind, Value::Object(body)))
    }
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}
