use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{KeyValueStore, StorageError};

/// Ephemeral in-process store. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::run_conformance_suite;

    #[tokio::test]
    async fn memory_store_conformance() {
        let report = run_conformance_suite(|| async { MemoryStore::new() }).await;
        assert_eq!(report.failed, 0, "{report}");
        assert!(report.total > 0);
    }

    #[tokio::test]
    async fn with_entries_prepopulates() {
        let store = MemoryStore::with_entries([("a", "1"), ("b", "2")]);
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
    }
}
