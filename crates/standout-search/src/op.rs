//! Lookup operators and the clause shapes they render to.
//!
//! A lookup key is a field name with an optional `__suffix`
//! (`title__text`, `width__gte`). The suffix selects an [`Op`], and the op
//! decides which engine clause the lookup becomes. Filter rendering and query
//! rendering both go through this table, so the two never drift apart.

use crate::error::{Result, SearchError};

/// Operator selected by a lookup-key suffix.
///
/// | Suffix | Op | Clause |
/// |--------|----|--------|
/// | *(none)* | `Term` | `term` |
/// | `text` | `Text` | `text` |
/// | `startswith`, `prefix` | `Prefix` | `prefix` |
/// | `fuzzy` | `Fuzzy` | `fuzzy` |
/// | `in` | `In` | `terms` |
/// | `range` | `Range` | `range` (`gte`/`lte`) |
/// | `gt`, `gte`, `lt`, `lte` | `Gt`.. | `range` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Exact match.
    Term,
    /// Analyzed full-text match.
    Text,
    /// Prefix match.
    Prefix,
    /// Fuzzy (edit-distance) match.
    Fuzzy,
    /// Value is one of a list.
    In,
    /// Inclusive `[low, high]` range.
    Range,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
}

/// Engine clause a lookup renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Term,
    Text,
    Prefix,
    Fuzzy,
    Terms,
    Range,
}

impl ClauseKind {
    /// Returns the clause name used in the request document.
    pub fn as_str(self) -> &'static str {
        match self {
            ClauseKind::Term => "term",
            ClauseKind::Text => "text",
            ClauseKind::Prefix => "prefix",
            ClauseKind::Fuzzy => "fuzzy",
            ClauseKind::Terms => "terms",
            ClauseKind::Range => "range",
        }
    }
}

impl Op {
    /// Every operator, in table order.
    pub const ALL: [Op; 10] = [
        Op::Term,
        Op::Text,
        Op::Prefix,
        Op::Fuzzy,
        Op::In,
        Op::Range,
        Op::Gt,
        Op::Gte,
        Op::Lt,
        Op::Lte,
    ];

    /// Resolves a lookup suffix. `None` means no suffix was given.
    ///
    /// `field` is only used to make the error readable.
    pub fn from_suffix(field: &str, suffix: Option<&str>) -> Result<Op> {
        let op = match suffix {
            None => Op::Term,
            Some("text") => Op::Text,
            Some("startswith") | Some("prefix") => Op::Prefix,
            Some("fuzzy") => Op::Fuzzy,
            Some("in") => Op::In,
            Some("range") => Op::Range,
            Some("gt") => Op::Gt,
            Some("gte") => Op::Gte,
            Some("lt") => Op::Lt,
            Some("lte") => Op::Lte,
            Some(other) => {
                return Err(SearchError::UnknownOperator {
                    field: field.to_string(),
                    suffix: other.to_string(),
                })
            }
        };
        Ok(op)
    }

    /// Returns the engine clause this operator renders to.
    pub fn clause_kind(self) -> ClauseKind {
        match self {
            Op::Term => ClauseKind::Term,
            Op::Text => ClauseKind::Text,
            Op::Prefix => ClauseKind::Prefix,
            Op::Fuzzy => ClauseKind::Fuzzy,
            Op::In => ClauseKind::Terms,
            Op::Range | Op::Gt | Op::Gte | Op::Lt | Op::Lte => ClauseKind::Range,
        }
    }

    /// Returns the range bound key for single-bound comparisons.
    pub fn range_bound(self) -> Option<&'static str> {
        match self {
            Op::Gt => Some("gt"),
            Op::Gte => Some("gte"),
            Op::Lt => Some("lt"),
            Op::Lte => Some("lte"),
            _ => None,
        }
    }

    /// Key that holds the value when a clause carries extra options
    /// such as a boost.
    pub fn value_key(self) -> &'static str {
        match self {
            Op::Text => "query",
            _ => "value",
        }
    }

    /// Returns the canonical suffix, or `None` for plain term lookups.
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Op::Term => None,
            Op::Text => Some("text"),
            Op::Prefix => Some("prefix"),
            Op::Fuzzy => Some("fuzzy"),
            Op::In => Some("in"),
            Op::Range => Some("range"),
            Op::Gt => Some("gt"),
            Op::Gte => Some("gte"),
            Op::Lt => Some("lt"),
            Op::Lte => Some("lte"),
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix().unwrap_or("term"))
    }
}
