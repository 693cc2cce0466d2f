//! Executing searches.
//!
//! A [`Searcher`] owns a [`Transport`] and a [`SearchConfig`] and turns
//! [`Search`] values into lazily executed [`ResultSet`]s. Nothing is sent
//! until a result set is first read.

use std::sync::Once;

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::mlt::MoreLikeThis;
use crate::query::Search;
use crate::results::{Hydrator, ResultSet};
use crate::traits::ModelStore;
use crate::transport::{Document, RawHit, ResultEnvelope, Transport};

const LOG_TARGET: &str = "standout_search::search";

static DISABLED_NOTICE: Once = Once::new();

/// Runs searches against one engine.
///
/// ```
/// use serde_json::Value;
/// use standout_search::{ResultEnvelope, Result, Search, SearchConfig, Searcher, Transport};
///
/// struct Empty;
///
/// impl Transport for Empty {
///     fn search(&self, _: &Value, _: &str, _: &str) -> Result<ResultEnvelope> {
///         Ok(ResultEnvelope::default())
///     }
///     fn refresh(&self, _: &str) -> Result<()> { Ok(()) }
///     fn delete_index(&self, _: &str) -> Result<()> { Ok(()) }
/// }
///
/// let searcher = Searcher::new(Empty, SearchConfig::with_default_index("test"));
/// let results = searcher.results(&Search::new("fake").query("car").unwrap());
/// assert_eq!(results.len().unwrap(), 0);
/// ```
#[derive(Debug)]
pub struct Searcher<T> {
    transport: T,
    config: SearchConfig,
}

impl<T: Transport> Searcher<T> {
    pub fn new(transport: T, config: SearchConfig) -> Self {
        Searcher { transport, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the index `search` will be sent to.
    pub fn index_for<'s>(&'s self, search: &'s Search) -> Result<&'s str> {
        match search.index_override() {
            Some(index) => Ok(index),
            None => self.config.index_for(search.doctype()),
        }
    }

    /// Results whose objects are the stored source documents.
    pub fn results(&self, search: &Search) -> ResultSet<'_, Document> {
        ResultSet::new(
            self.dispatch(),
            search.clone(),
            Request::Search,
            Hydrator::Source(source_document),
        )
    }

    /// Results whose objects are hydrated through `store`.
    pub fn results_with<'a, S>(&'a self, search: &Search, store: &'a S) -> ResultSet<'a, S::Model>
    where
        S: ModelStore,
    {
        ResultSet::new(
            self.dispatch(),
            search.clone(),
            Request::Search,
            Hydrator::Store(store),
        )
    }

    /// Documents similar to the one named by `mlt`.
    pub fn more_like_this(&self, mlt: &MoreLikeThis) -> ResultSet<'_, Document> {
        ResultSet::new(
            self.dispatch(),
            mlt.search().clone(),
            Request::MoreLikeThis {
                id: mlt.id().to_string(),
                params: mlt.params(),
            },
            Hydrator::Source(source_document),
        )
    }

    /// Makes recent writes to `index` searchable.
    pub fn refresh(&self, index: &str) -> Result<()> {
        self.ensure_enabled()?;
        debug!(target: LOG_TARGET, index, "refreshing index");
        self.transport.refresh(index)
    }

    /// Deletes `index`.
    pub fn delete_index(&self, index: &str) -> Result<()> {
        self.ensure_enabled()?;
        debug!(target: LOG_TARGET, index, "deleting index");
        self.transport.delete_index(index)
    }

    fn ensure_enabled(&self) -> Result<()> {
        ensure_enabled(&self.config)
    }

    fn dispatch(&self) -> Dispatch<'_> {
        Dispatch {
            transport: &self.transport,
            config: &self.config,
        }
    }
}

/// What a result set asks the engine for.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Request {
    Search,
    MoreLikeThis {
        id: String,
        params: Map<String, Value>,
    },
}

/// The borrowed half of a [`Searcher`] that result sets carry around.
#[derive(Clone, Copy)]
pub(crate) struct Dispatch<'a> {
    transport: &'a dyn Transport,
    config: &'a SearchConfig,
}

impl Dispatch<'_> {
    /// Compiles `search` and sends it. Transport errors come back unchanged.
    pub(crate) fn send(&self, search: &Search, request: &Request) -> Result<ResultEnvelope> {
        ensure_enabled(self.config)?;

        let index = match search.index_override() {
            Some(index) => index,
            None => self.config.index_for(search.doctype())?,
        };
        let doctype = search.doctype();
        let body = search.build_query();

        let outcome = match request {
            Request::Search => self.transport.search(&body, index, doctype),
            Request::MoreLikeThis { id, params } => {
                self.transport
                    .more_like_this(index, doctype, id, params, &body)
            }
        };

        match outcome {
            Ok(envelope) => {
                debug!(
                    target: LOG_TARGET,
                    index,
                    doctype,
                    request = %body,
                    took = envelope.took,
                    total = envelope.hits.total,
                    "search executed"
                );
                Ok(envelope)
            }
            Err(err) => {
                error!(
                    target: LOG_TARGET,
                    index,
                    doctype,
                    request = %body,
                    error = %err,
                    "search failed"
                );
                Err(err)
            }
        }
    }
}

fn ensure_enabled(config: &SearchConfig) -> Result<()> {
    if config.disabled {
        DISABLED_NOTICE.call_once(|| {
            debug!(target: LOG_TARGET, "searching is disabled, skipping requests");
        });
        return Err(SearchError::Disabled);
    }
    Ok(())
}

fn source_document(hit: &RawHit) -> Document {
    hit.source
        .clone()
        .or_else(|| hit.fields.clone())
        .unwrap_or_default()
}
