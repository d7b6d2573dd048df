//! The read-through cache in front of the scraper.

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{cache::Cache, error::ScrapeError, scrape::Scraper, skip::SkipLocation};

pub static CACHE_KEY: &str = "skip_locations";
pub const DEFAULT_TTL: Duration = Duration::from_secs(3 * 60 * 60);

/// Serves the current skip locations, scraping at most once at a time.
pub struct LocationService {
    cache: Arc<dyn Cache>,
    scraper: Arc<dyn Scraper>,
    ttl: Duration,
    refresh: Mutex<()>,
}

impl LocationService {
    pub fn new(cache: Arc<dyn Cache>, scraper: Arc<dyn Scraper>, ttl: Duration) -> Self {
        Self {
            cache,
            scraper,
            ttl,
            refresh: Mutex::new(()),
        }
    }

    /// Get the locations from the cache, or scrape and cache them on a miss.
    ///
    /// Callers missing the cache queue up behind one refresh and then re-read the cache.
    /// A cache which fails is treated as empty.
    pub async fn get_locations(&self) -> Result<Vec<SkipLocation>, ScrapeError> {
        match self.cache.get(CACHE_KEY).await {
            Ok(Some(locations)) => {
                debug!("serving skip locations from cache");
                return Ok(locations);
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "cache read failed"),
        }

        let _refresh = self.refresh.lock().await;
        if let Ok(Some(locations)) = self.cache.get(CACHE_KEY).await {
            debug!("skip locations were refreshed while waiting");
            return Ok(locations);
        }

        info!("cache miss, scraping fresh skip locations");
        let locations = self.scraper.fetch().await?;
        if let Err(err) = self.cache.set(CACHE_KEY, &locations, self.ttl).await {
            warn!(error = %err, "cache write failed");
        }
        Ok(locations)
    }
}
