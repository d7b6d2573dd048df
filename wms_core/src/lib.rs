//! This crate finds Wandsworth's upcoming mega skip days and turns them into calendar events.
//!
//! The dates and sites are read from <https://www.wandsworth.gov.uk/mega-skip-days>,
//! geocoded through Nominatim and cached between scrapes.

pub use reqwest;

pub mod cache;
pub mod calendar;
pub mod error;
pub mod geocoder;
pub mod location_service;
pub mod page_parser;
pub mod postcode;
pub mod scrape;
pub mod skip;

use std::time::Duration;

pub use cache::{Cache, MemoryCache, RemoteCache};
pub use error::{CacheError, GeocodeError, ScrapeError, ValidationError};
pub use geocoder::Geocoder;
pub use location_service::LocationService;
pub use scrape::{CouncilScraper, Scraper};
pub use skip::{Coordinate, SkipLocation};

/// Timeout applied to every outbound HTTP call.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client shared by the scraper, the geocoder and the remote cache.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()
}
