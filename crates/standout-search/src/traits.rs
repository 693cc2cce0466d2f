//! The model seam used to hydrate object-style results.
//!
//! Object projection returns the caller's own entities rather than raw
//! documents. The search collects the ids of its hits and asks a
//! [`ModelStore`] for the matching entities in one call.

use std::collections::HashMap;

use crate::error::Result;

/// Looks up entities by the ids the engine returned.
///
/// # Manual Implementation
///
/// ```
/// use std::collections::HashMap;
/// use standout_search::{ModelStore, Result};
///
/// struct Task {
///     id: u64,
///     name: String,
/// }
///
/// struct TaskTable(Vec<Task>);
///
/// impl ModelStore for TaskTable {
///     type Model = String;
///
///     fn lookup_many(&self, ids: &[String]) -> Result<HashMap<String, String>> {
///         Ok(self
///             .0
///             .iter()
///             .filter(|t| ids.contains(&t.id.to_string()))
///             .map(|t| (t.id.to_string(), t.name.clone()))
///             .collect())
///     }
/// }
/// ```
///
/// Closures with the same signature are stores too.
pub trait ModelStore {
    /// The hydrated entity type.
    type Model;

    /// Returns the entities for `ids`. Ids with no entity are simply absent
    /// from the map; their hits are dropped from object results.
    fn lookup_many(&self, ids: &[String]) -> Result<HashMap<String, Self::Model>>;
}

impl<F, M> ModelStore for F
where
    F: Fn(&[String]) -> Result<HashMap<String, M>>,
{
    type Model = M;

    fn lookup_many(&self, ids: &[String]) -> Result<HashMap<String, M>> {
        self(ids)
    }
}
