//! Namespace → commit store lookup.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::error::ConfigError;
use super::store::CommitStore;

/// Maps store namespaces to commit stores.
///
/// Create one per process and hand it to every [`Git`](super::Git) handle.
/// Tests tear it down with [`StoreRegistry::clear`].
#[derive(Default)]
pub struct StoreRegistry {
    stores: RwLock<IndexMap<String, Arc<dyn CommitStore>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `store` under `namespace`, returning the store it replaced.
    pub fn register(
        &self,
        namespace: impl Into<String>,
        store: Arc<dyn CommitStore>,
    ) -> Option<Arc<dyn CommitStore>> {
        self.stores.write().insert(namespace.into(), store)
    }

    pub fn get(&self, namespace: &str) -> Result<Arc<dyn CommitStore>, ConfigError> {
        self.stores
            .read()
            .get(namespace)
            .cloned()
            .ok_or_else(|| ConfigError::MissingStore(namespace.to_string()))
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.stores.read().contains_key(namespace)
    }

    /// Registered namespaces, in registration order.
    pub fn namespaces(&self) -> Vec<String> {
        self.stores.read().keys().cloned().collect()
    }

    pub fn clear(&self) {
        self.stores.write().clear();
    }
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::memory::MemoryStore;

    #[test]
    fn register_get_clear() {
        let registry = StoreRegistry::new();
        assert!(matches!(
            registry.get("users.git"),
            Err(ConfigError::MissingStore(ns)) if ns == "users.git"
        ));

        assert!(registry.register("users.git", Arc::new(MemoryStore::new())).is_none());
        assert!(registry.register("posts.git", Arc::new(MemoryStore::new())).is_none());
        assert!(registry.get("users.git").is_ok());
        assert_eq!(registry.namespaces(), vec!["users.git", "posts.git"]);

        assert!(registry.register("users.git", Arc::new(MemoryStore::new())).is_some());

        registry.clear();
        assert!(!registry.contains("users.git"));
    }
}
