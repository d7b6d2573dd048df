use std::{sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use wms_core::{geocoder, reqwest, scrape, Cache, MemoryCache, RemoteCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheKind {
    Memory,
    Redis,
}

/// Serve Wandsworth's mega skip days as JSON and iCalendar feeds.
#[derive(Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// the port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,
    /// how long scraped locations are cached, at least one minute
    #[arg(
        long,
        env = "CACHE_TTL_MINUTES",
        default_value_t = 180,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub cache_ttl_minutes: u64,
    /// where scraped locations are cached
    #[arg(long, env = "CACHE_TYPE", value_enum, default_value_t = CacheKind::Memory)]
    pub cache_type: CacheKind,
    /// the Upstash REST URL of the redis cache
    #[arg(long, env = "UPSTASH_REDIS_REST_URL")]
    pub redis_url: Option<String>,
    /// the Upstash REST token of the redis cache
    #[arg(long, env = "UPSTASH_REDIS_REST_TOKEN", hide_env_values = true)]
    pub redis_token: Option<String>,
    /// the council page listing the mega skip days
    #[arg(long, env = "COUNCIL_URL", default_value = scrape::DEFAULT_URL)]
    pub council_url: String,
    /// the Nominatim compatible geocoding service
    #[arg(long, env = "GEOCODER_URL", default_value = geocoder::DEFAULT_URL)]
    pub geocoder_url: String,
    /// the pause between two geocoding requests, at least 200
    #[arg(long, env = "GEOCODE_DELAY_MS", default_value_t = 200)]
    pub geocode_delay_ms: u64,
    /// the log filter used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("cache_ttl_minutes", &self.cache_ttl_minutes)
            .field("cache_type", &self.cache_type)
            .field("redis_url", &self.redis_url)
            .field("redis_token", &self.redis_token.as_ref().map(|_| "[redacted]"))
            .field("council_url", &self.council_url)
            .field("geocoder_url", &self.geocoder_url)
            .field("geocode_delay_ms", &self.geocode_delay_ms)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes * 60)
    }

    pub fn geocode_delay(&self) -> Duration {
        Duration::from_millis(self.geocode_delay_ms)
    }

    /// The redis URL and token, if the redis cache is selected and fully configured.
    pub fn redis_credentials(&self) -> Option<(&str, &str)> {
        if self.cache_type != CacheKind::Redis {
            return None;
        }
        match (self.redis_url.as_deref(), self.redis_token.as_deref()) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => Some((url, token)),
            _ => None,
        }
    }

    /// Build the configured cache. An incomplete redis configuration falls back to memory.
    pub fn build_cache(&self, client: reqwest::Client) -> Arc<dyn Cache> {
        if let Some((url, token)) = self.redis_credentials() {
            info!(url, "using redis cache");
            return Arc::new(RemoteCache::new(client, url, token));
        }
        if self.cache_type == CacheKind::Redis {
            warn!("redis cache selected without URL and token");
        }
        info!("using in-memory cache");
        Arc::new(MemoryCache::new())
    }
}
