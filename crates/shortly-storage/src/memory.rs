use dashmap::DashMap;
use shortly_core::{KeyValueStore, StorageError};
use std::sync::Arc;

/// In-memory implementation of [`KeyValueStore`] using DashMap.
///
/// Clones share the same map, so a caller can hand one handle to a registry
/// and keep another to inspect what was persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    storage: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.storage.insert(key.into(), value.into());
        store
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.storage.get(key).map(|value| value.clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
