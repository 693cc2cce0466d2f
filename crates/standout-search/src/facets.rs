//! Facet response parsing.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Facet buckets by facet name.
pub type FacetCounts = BTreeMap<String, Vec<Value>>;

/// Extracts the buckets of every `terms` and `range` facet.
///
/// Facets of any other type are left out; they stay reachable through the
/// raw facet mapping.
///
/// ```
/// use serde_json::json;
/// use standout_search::parse_facets;
///
/// let raw = json!({
///     "tag": {"_type": "terms", "terms": [{"term": "awesome", "count": 3}]},
///     "stats": {"_type": "statistical", "count": 5}
/// });
/// let facets = parse_facets(raw.as_object().unwrap());
/// assert_eq!(facets["tag"], vec![json!({"term": "awesome", "count": 3})]);
/// assert!(!facets.contains_key("stats"));
/// ```
pub fn parse_facets(raw: &Map<String, Value>) -> FacetCounts {
    let mut counts = FacetCounts::new();
    for (name, facet) in raw {
        let buckets = match facet.get("_type").and_then(Value::as_str) {
            Some("terms") => facet.get("terms"),
            Some("range") => facet.get("ranges"),
            _ => continue,
        };
        let buckets = buckets
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        counts.insert(name.clone(), buckets);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: Value) -> FacetCounts {
        parse_facets(raw.as_object().unwrap())
    }

    #[test]
    fn terms_and_ranges() {
        let facets = parse(json!({
            "tag": {"_type": "terms", "terms": [
                {"term": "awesome", "count": 3},
                {"term": "boring", "count": 1}
            ]},
            "width": {"_type": "range", "ranges": [
                {"from": 0, "to": 5, "count": 1}
            ]}
        }));
        assert_eq!(facets["tag"].len(), 2);
        assert_eq!(facets["width"], vec![json!({"from": 0, "to": 5, "count": 1})]);
    }

    #[test]
    fn missing_buckets_are_empty() {
        let facets = parse(json!({"tag": {"_type": "terms"}}));
        assert!(facets["tag"].is_empty());
    }

    #[test]
    fn untyped_facets_are_skipped() {
        assert!(parse(json!({"tag": {"terms": []}})).is_empty());
    }
}
