//! Caches for the scraped skip locations.

pub mod memory;
pub mod remote;

use std::time::Duration;

use async_trait::async_trait;

pub use memory::MemoryCache;
pub use remote::RemoteCache;

use crate::{error::CacheError, skip::SkipLocation};

/// A key value store for location lists with a time to live.
///
/// `Ok(None)` is a miss. An `Err` means the backend is unavailable and is never an empty list.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<SkipLocation>>, CacheError>;

    async fn set(&self, key: &str, value: &[SkipLocation], ttl: Duration) -> Result<(), CacheError>;
}
