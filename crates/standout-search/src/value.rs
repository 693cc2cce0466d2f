//! Owned values for predicates and boosts.
//!
//! [`Term`] is what a lookup compares against. It owns its data so filter
//! trees can be stored, cloned, and compared structurally, and it renders to
//! JSON without losing the caller's numeric kind.

use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Value a predicate compares against.
///
/// # Example
///
/// ```
/// use standout_search::{Number, Term};
///
/// assert_eq!(Term::from("awesome"), Term::Str("awesome".to_string()));
/// assert_eq!(Term::from(7), Term::Number(Number::I64(7)));
/// assert_eq!(
///     Term::from(vec!["a", "b"]),
///     Term::List(vec![Term::from("a"), Term::from("b")])
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// String value.
    Str(String),
    /// Numeric value.
    Number(Number),
    /// Boolean value.
    Bool(bool),
    /// Ordered sequence of values (for `in` and `range` lookups).
    List(Vec<Term>),
}

impl Term {
    /// Returns the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[Term]> {
        match self {
            Term::List(items) => Some(items),
            _ => None,
        }
    }

    /// Renders this value as JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Term::Str(s) => Value::String(s.clone()),
            Term::Number(n) => n.to_json(),
            Term::Bool(b) => Value::Bool(*b),
            Term::List(items) => Value::Array(items.iter().map(Term::to_json).collect()),
        }
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Str(s)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Str(s.to_string())
    }
}

impl From<&String> for Term {
    fn from(s: &String) -> Self {
        Term::Str(s.clone())
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Bool(b)
    }
}

impl From<Number> for Term {
    fn from(n: Number) -> Self {
        Term::Number(n)
    }
}

impl<T: Into<Term>> From<Vec<T>> for Term {
    fn from(items: Vec<T>) -> Self {
        Term::List(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! term_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Term {
                fn from(n: $t) -> Self {
                    Term::Number(Number::from(n))
                }
            }
        )*
    };
}

term_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision and the
/// rendered form: `2` stays an integer in the request, `0.8` stays a float.
///
/// Equality and hashing are structural: `I64(2)` and `F64(2.0)` are different
/// values, and floats compare by bit pattern.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Renders the number as JSON. Non-finite floats render as `null`.
    pub fn to_json(self) -> Value {
        match self {
            Number::I64(n) => Value::from(n),
            Number::U64(n) => Value::from(n),
            Number::F64(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => a == b,
            (Number::U64(a), Number::U64(b)) => a == b,
            (Number::F64(a), Number::F64(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Number::I64(n) => n.hash(state),
            Number::U64(n) => n.hash(state),
            Number::F64(n) => n.to_bits().hash(state),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Number::I64(n) => serializer.serialize_i64(*n),
            Number::U64(n) => serializer.serialize_u64(*n),
            Number::F64(n) => serializer.serialize_f64(*n),
        }
    }
}

impl From<i8> for Number {
    fn from(n: i8) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i16> for Number {
    fn from(n: i16) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<isize> for Number {
    fn from(n: isize) -> Self {
        Number::I64(n as i64)
    }
}

impl From<u8> for Number {
    fn from(n: u8) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u16> for Number {
    fn from(n: u16) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::U64(n as u64)
    }
}

impl From<f32> for Number {
    fn from(n: f32) -> Self {
        Number::F64(n as f64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}
