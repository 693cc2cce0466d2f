//! Ordering types for sorting search results.
//!
//! Provides [`Dir`] for sort direction and [`OrderBy`] for field-based ordering.

use serde_json::{Map, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ordering clause specifying a field and direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    pub dir: Dir,
}

impl OrderBy {
    /// Creates a new ascending ordering for the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            dir: Dir::Asc,
        }
    }

    /// Creates a new descending ordering for the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            dir: Dir::Desc,
        }
    }

    /// Creates a new ordering with the given direction.
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        OrderBy {
            field: field.into(),
            dir,
        }
    }

    /// Parses `field` (ascending) or `-field` (descending).
    ///
    /// ```
    /// use standout_search::{Dir, OrderBy};
    ///
    /// assert_eq!(OrderBy::parse("-width"), OrderBy::new("width", Dir::Desc));
    /// assert_eq!(OrderBy::parse("width"), OrderBy::new("width", Dir::Asc));
    /// ```
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix('-') {
            Some(field) => OrderBy::desc(field),
            None => OrderBy::asc(spec),
        }
    }

    /// Renders this ordering as a sort entry: `{"field": "asc"}`.
    pub fn render(&self) -> Value {
        let mut entry = Map::new();
        entry.insert(self.field.clone(), Value::from(self.dir.as_str()));
        Value::Object(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dir_display() {
        assert_eq!(Dir::Asc.to_string(), "asc");
        assert_eq!(Dir::Desc.to_string(), "desc");
        assert_eq!(Dir::default(), Dir::Asc);
    }

    #[test]
    fn order_by_constructors() {
        let asc = OrderBy::asc("name");
        assert_eq!(asc.field, "name");
        assert_eq!(asc.dir, Dir::Asc);

        let desc = OrderBy::desc("priority");
        assert_eq!(desc.field, "priority");
        assert_eq!(desc.dir, Dir::Desc);
    }

    #[test]
    fn parse_prefix() {
        assert_eq!(OrderBy::parse("-width"), OrderBy::desc("width"));
        assert_eq!(OrderBy::parse("width"), OrderBy::asc("width"));
        // Only the leading dash is a direction marker.
        assert_eq!(OrderBy::parse("--x"), OrderBy::desc("-x"));
    }

    #[test]
    fn render_entry() {
        assert_eq!(OrderBy::desc("width").render(), json!({"width": "desc"}));
        assert_eq!(OrderBy::asc("id").render(), json!({"id": "asc"}));
    }
}
