use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{cache::Cache, error::CacheError, skip::SkipLocation};

#[derive(Debug)]
struct CacheEntry {
    value: Vec<SkipLocation>,
    expires_at: Instant,
}

/// An in-process cache. Expired entries are only dropped when overwritten.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<SkipLocation>>, CacheError> {
        let entries = self.entries.read().await;
        let value = entries
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone());
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[SkipLocation], ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry {
            value: value.to_vec(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}
