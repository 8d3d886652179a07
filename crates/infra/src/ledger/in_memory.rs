use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;
use serde_json::Value as JsonValue;

use super::{KvStore, Namespace, StoreError, Versioned};

/// In-memory versioned ledger.
///
/// Intended for tests, benchmarks and the single-process node. Writes to a
/// namespace can be made to fail on purpose to exercise partial-failure
/// handling.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    keys: RwLock<BTreeMap<(Namespace, String), Vec<Versioned>>>,
    failing: RwLock<HashSet<Namespace>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write to `namespace` fail with a backend error.
    pub fn fail_writes_to(&self, namespace: Namespace) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(namespace);
        }
    }

    /// Undo [`fail_writes_to`](Self::fail_writes_to).
    pub fn heal(&self, namespace: Namespace) {
        if let Ok(mut failing) = self.failing.write() {
            failing.remove(&namespace);
        }
    }

    fn is_failing(&self, namespace: Namespace) -> Result<bool, StoreError> {
        let failing = self.failing.read().map_err(|_| StoreError::Poisoned)?;
        Ok(failing.contains(&namespace))
    }
}

impl KvStore for InMemoryKvStore {
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<JsonValue>, StoreError> {
        let keys = self.keys.read().map_err(|_| StoreError::Poisoned)?;
        Ok(keys
            .get(&(namespace, key.to_string()))
            .and_then(|versions| versions.last())
            .map(|v| v.value.clone()))
    }

    fn put(&self, namespace: Namespace, key: &str, value: JsonValue) -> Result<u64, StoreError> {
        if self.is_failing(namespace)? {
            return Err(StoreError::backend(namespace, format!("write to '{key}' rejected")));
        }
        let mut keys = self.keys.write().map_err(|_| StoreError::Poisoned)?;
        let versions = keys.entry((namespace, key.to_string())).or_default();
        let version = versions.last().map(|v| v.version).unwrap_or(0) + 1;
        versions.push(Versioned {
            version,
            committed_at: Utc::now(),
            value,
        });
        Ok(version)
    }

    fn scan(&self, namespace: Namespace) -> Result<Vec<(String, JsonValue)>, StoreError> {
        let keys = self.keys.read().map_err(|_| StoreError::Poisoned)?;
        Ok(keys
            .iter()
            .filter(|((ns, _), _)| *ns == namespace)
            .filter_map(|((_, key), versions)| versions.last().map(|v| (key.clone(), v.value.clone())))
            .collect())
    }

    fn history(&self, namespace: Namespace, key: &str) -> Result<Vec<Versioned>, StoreError> {
        let keys = self.keys.read().map_err(|_| StoreError::Poisoned)?;
        Ok(keys.get(&(namespace, key.to_string())).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use materialtrace_fulfillment::Partition;
    use serde_json::json;

    #[test]
    fn put_creates_versions_and_get_returns_latest() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.put(Namespace::World, "po-1", json!({"n": 1})).unwrap(), 1);
        assert_eq!(store.put(Namespace::World, "po-1", json!({"n": 2})).unwrap(), 2);

        assert_eq!(store.get(Namespace::World, "po-1").unwrap(), Some(json!({"n": 2})));
        let history = store.history(Namespace::World, "po-1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].value, json!({"n": 1}));
        assert!(history[0].committed_at <= history[1].committed_at);
    }

    #[test]
    fn namespaces_are_isolated() {
        let store = InMemoryKvStore::new();
        let logistics = Namespace::Private(Partition::Logistics);
        store.put(logistics, "po-1", json!("shipping")).unwrap();

        assert_eq!(store.get(Namespace::World, "po-1").unwrap(), None);
        assert_eq!(store.scan(logistics).unwrap().len(), 1);
        assert!(store.scan(Namespace::World).unwrap().is_empty());
    }

    #[test]
    fn scan_is_ordered_by_key() {
        let store = InMemoryKvStore::new();
        for key in ["c", "a", "b"] {
            store.put(Namespace::World, key, json!(key)).unwrap();
        }
        let keys: Vec<_> = store.scan(Namespace::World).unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn failing_namespace_rejects_writes_until_healed() {
        let store = InMemoryKvStore::new();
        let progress = Namespace::Private(Partition::GeneralProgress);
        store.fail_writes_to(progress);

        match store.put(progress, "po-1", json!({})).unwrap_err() {
            StoreError::Backend { namespace, .. } => assert_eq!(namespace, "collectionGeneralProgress"),
            _ => panic!("Expected Backend error"),
        }
        assert!(store.put(Namespace::World, "po-1", json!({})).is_ok());

        store.heal(progress);
        assert!(store.put(progress, "po-1", json!({})).is_ok());
    }

    #[test]
    fn store_errors_become_persistence_failures() {
        let err: materialtrace_core::DomainError = StoreError::Poisoned.into();
        assert!(matches!(err, materialtrace_core::DomainError::Persistence(_)));
    }
}
