//! Resource loading seam between the resolver and physical storage

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{LoadError, LoadResult};

/// Loads a named resource into a code-to-template map
///
/// Implementations read from wherever bundles physically live and stay
/// oblivious to locales and caching; the engine hands them fully expanded
/// bundle filenames such as `messages_en_US`. Loads may run under the
/// bundle cache's internal lock, so implementations must not call back
/// into the resolver that owns them.
pub trait ResourceLoader: Send + Sync {
    /// Load the named resource, failing if it cannot be found or read
    fn load(&self, name: &str) -> LoadResult<HashMap<String, String>>;
}

/// Lets a shared loader be handed to a resolver while the caller keeps a
/// handle to it
impl<T: ResourceLoader + ?Sized> ResourceLoader for Arc<T> {
    fn load(&self, name: &str) -> LoadResult<HashMap<String, String>> {
        (**self).load(name)
    }
}

/// In-memory loader backed by a fixed name-to-bundle table
///
/// Useful for embedded default messages and for tests. Names without a
/// registered bundle fail as unavailable, exactly like a missing file.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    bundles: HashMap<String, HashMap<String, String>>,
}

impl StaticLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bundle under a fully expanded filename
    pub fn with_bundle<I, K, V>(mut self, name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.bundles.insert(
            name.into(),
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }
}

impl ResourceLoader for StaticLoader {
    fn load(&self, name: &str) -> LoadResult<HashMap<String, String>> {
        match self.bundles.get(name) {
            Some(entries) => {
                debug!("Loaded static bundle '{}' with {} entries", name, entries.len());
                Ok(entries.clone())
            }
            None => Err(LoadError::unavailable(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_bundle_loads() {
        let loader = StaticLoader::new().with_bundle("messages_en", [("a", "1"), ("b", "2")]);

        let entries = loader.load("messages_en").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["a"], "1");
    }

    #[test]
    fn test_unregistered_name_is_unavailable() {
        let loader = StaticLoader::new();
        let error = loader.load("missing").unwrap_err();
        assert!(matches!(error, LoadError::Unavailable { .. }));
        assert_eq!(error.resource_name(), "missing");
    }

    #[test]
    fn test_registering_twice_replaces() {
        let loader = StaticLoader::new()
            .with_bundle("messages", [("a", "old")])
            .with_bundle("messages", [("a", "new")]);

        let entries = loader.load("messages").unwrap();
        assert_eq!(entries["a"], "new");
    }
}
