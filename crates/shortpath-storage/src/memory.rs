use async_trait::async_trait;
use dashmap::DashMap;
use shortpath_core::error::Result;
use shortpath_core::{Context, KvStore, StoreError};

/// In-memory implementation of [`KvStore`] using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    storage: DashMap<String, String>,
}

impl InMemoryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn put(&self, _ctx: &Context, key: &str, value: &str) -> Result<()> {
        self.storage.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn get(&self, _ctx: &Context, key: &str) -> Result<String> {
        self.storage
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn exists(&self, _ctx: &Context, key: &str) -> Result<bool> {
        Ok(self.storage.contains_key(key))
    }

    async fn delete(&self, _ctx: &Context, key: &str) -> Result<()> {
        self.storage.remove(key);
        Ok(())
    }
}
