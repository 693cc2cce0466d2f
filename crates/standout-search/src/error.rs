//! Error types for the search crate.

use thiserror::Error;

/// Errors that can occur when building, compiling, or executing searches.
#[derive(Debug, Error)]
pub enum SearchError {
    /// `query()` was called with both a bare text argument and keyword
    /// predicates, or with neither.
    #[error("invalid query arguments: {0}")]
    InvalidQueryArguments(String),

    /// A lookup key used a `__suffix` that has no operator.
    #[error("unknown operator '{suffix}' on field '{field}'")]
    UnknownOperator { field: String, suffix: String },

    /// The value given to a lookup does not fit its operator.
    #[error("invalid value for '{key}': expected {expected}")]
    InvalidLookupValue { key: String, expected: &'static str },

    /// The transport failed to reach the engine or the engine rejected the request.
    #[error("transport error: {0}")]
    Transport(String),

    /// The engine reported that the target index does not exist.
    #[error("index missing: {0}")]
    IndexMissing(String),

    /// Searching is switched off in the configuration.
    #[error("search is disabled")]
    Disabled,

    /// Configuration could not be resolved.
    #[error("configuration error: {0}")]
    Config(String),

    /// A response or config document was not valid JSON of the expected shape.
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// A YAML config document could not be parsed.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Reading a config file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    /// Returns `true` for failures reported by the transport collaborator.
    pub fn is_transport(&self) -> bool {
        matches!(self, SearchError::Transport(_) | SearchError::IndexMissing(_))
    }
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
