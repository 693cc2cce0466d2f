//! Search - a fluent query builder for document-search engines.
//!
//! Search compiles chained filter, query, facet, and highlight declarations
//! into the request document an Elasticsearch-style engine consumes, and
//! wraps the returned hits in lazily executed result sets. It supports:
//!
//! - Lookup keys with operator suffixes: `field`, `field__text`, `width__gte`
//! - A boolean filter algebra: AND, OR, NOT over predicates, nested freely
//! - Per-field weights (boosts) on query clauses
//! - Object, dict, and list projections with highlighting
//! - Slicing, counting, facets, and more-like-this searches
//!
//! The crate never opens a connection: requests go through a [`Transport`]
//! you provide.
//!
//! # Quick Start
//!
//! ```rust
//! use standout_search::{Filter, Kwargs, Search};
//! use serde_json::json;
//!
//! let search = Search::new("fake")
//!     .query(Kwargs::new().arg("foo__text", "car")).unwrap()
//!     .filter(Filter::lookup("width__gte", 5).unwrap()
//!         .or(Filter::lookup("tag", "boat").unwrap()))
//!     .order_by(["-width"]);
//!
//! assert_eq!(
//!     search.build_query(),
//!     json!({
//!         "query": {"text": {"foo": "car"}},
//!         "filter": {"bool": {"should": [
//!             {"range": {"width": {"gte": 5}}},
//!             {"term": {"tag": "boat"}}
//!         ]}},
//!         "sort": [{"width": "desc"}]
//!     })
//! );
//! ```
//!
//! # Builders Are Values
//!
//! Every chain method returns a new [`Search`]; the receiver is untouched.
//! A base search can be branched freely:
//!
//! ```rust
//! use standout_search::Search;
//!
//! let base = Search::new("fake").query("car").unwrap();
//! let first_page = base.slice(..10);
//! let second_page = base.slice(10..20);
//!
//! assert_eq!(base.stop(), None);
//! assert_eq!(first_page.stop(), Some(10));
//! assert_eq!(second_page.start(), 10);
//! ```
//!
//! # Lookup Suffixes
//!
//! | Suffix | Clause |
//! |--------|--------|
//! | *(none)* | `term` |
//! | `text` | `text` |
//! | `startswith`, `prefix` | `prefix` |
//! | `fuzzy` | `fuzzy` |
//! | `in` | `terms` |
//! | `range` | `range` with `gte`/`lte` |
//! | `gt`, `gte`, `lt`, `lte` | `range` |
//!
//! Unknown suffixes are rejected with [`SearchError::UnknownOperator`].

mod clause;
mod compile;
mod config;
mod error;
mod facets;
mod filter;
mod mlt;
mod op;
mod ordering;
mod query;
mod results;
mod searcher;
mod traits;
mod transport;
mod value;

// Re-export public API
pub use clause::{Lookup, Predicate};
pub use compile::CompiledRequest;
pub use config::{SearchConfig, DEFAULT_INDEX_KEY};
pub use error::{Result, SearchError};
pub use facets::{parse_facets, FacetCounts};
pub use filter::{Filter, Kwarg, Kwargs};
pub use mlt::MoreLikeThis;
pub use op::{ClauseKind, Op};
pub use ordering::{Dir, OrderBy};
pub use query::{
    Highlight, HighlightOptions, Projection, QueryArgs, QueryClause, Search, DEFAULT_QUERY_FIELD,
    ID_FIELD,
};
pub use results::{ResultSet, Row, SearchHit, REPR_OUTPUT_SIZE};
pub use searcher::Searcher;
pub use traits::ModelStore;
pub use transport::{Document, Highlights, Hits, RawHit, ResultEnvelope, Transport};
pub use value::{Number, Term};
