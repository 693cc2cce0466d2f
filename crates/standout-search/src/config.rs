//! Search configuration.
//!
//! [`SearchConfig`] decides which index a document type lives in and whether
//! searching is switched on at all. It deserializes from YAML or JSON:
//!
//! ```yaml
//! hosts: ["localhost:9200"]
//! timeout_secs: 1
//! disabled: false
//! indexes:
//!   default: sumo
//!   fake: test
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Key of the index used by document types without their own entry.
pub const DEFAULT_INDEX_KEY: &str = "default";

/// Index routing and global switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Engine hosts, for the transport.
    pub hosts: Vec<String>,
    /// Document type to index name; `default` catches the rest.
    pub indexes: BTreeMap<String, String>,
    /// Request timeout in seconds, for the transport.
    pub timeout_secs: u64,
    /// When set, every search fails fast with [`SearchError::Disabled`].
    pub disabled: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            hosts: vec!["localhost:9200".to_string()],
            indexes: BTreeMap::new(),
            timeout_secs: 1,
            disabled: false,
        }
    }
}

impl SearchConfig {
    /// Creates a config that sends everything to one index.
    pub fn with_default_index(index: impl Into<String>) -> Self {
        let mut config = SearchConfig::default();
        config
            .indexes
            .insert(DEFAULT_INDEX_KEY.to_string(), index.into());
        config
    }

    /// Routes a document type to its own index.
    pub fn route(mut self, doctype: impl Into<String>, index: impl Into<String>) -> Self {
        self.indexes.insert(doctype.into(), index.into());
        self
    }

    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config file. `.json` files are read as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Returns the index for a document type.
    pub fn index_for(&self, doctype: &str) -> Result<&str> {
        self.indexes
            .get(doctype)
            .or_else(|| self.indexes.get(DEFAULT_INDEX_KEY))
            .map(String::as_str)
            .ok_or_else(|| {
                SearchError::Config(format!(
                    "no index configured for '{}' and no '{}' index",
                    doctype, DEFAULT_INDEX_KEY
                ))
            })
    }

    /// Returns the default index, if configured.
    pub fn default_index(&self) -> Option<&str> {
        self.indexes.get(DEFAULT_INDEX_KEY).map(String::as_str)
    }
}
