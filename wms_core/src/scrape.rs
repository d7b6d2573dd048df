//! This scraper fetches the council's mega skip page and turns it into geocoded skip locations.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::{error::ScrapeError, geocoder::Geocoder, page_parser, skip::SkipLocation};

pub static DEFAULT_URL: &str = "https://www.wandsworth.gov.uk/mega-skip-days";

/// Nominatim blocks clients which query faster than this.
pub const MIN_GEOCODE_DELAY: Duration = Duration::from_millis(200);

/// A source of the complete list of upcoming skip locations.
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn fetch(&self) -> Result<Vec<SkipLocation>, ScrapeError>;
}

/// Scrapes the council website and geocodes every upcoming location.
#[derive(Debug, Clone)]
pub struct CouncilScraper {
    client: reqwest::Client,
    url: String,
    geocoder: Geocoder,
    geocode_delay: Duration,
}

impl CouncilScraper {
    pub fn new(client: reqwest::Client, url: impl Into<String>, geocoder: Geocoder) -> Self {
        Self {
            client,
            url: url.into(),
            geocoder,
            geocode_delay: MIN_GEOCODE_DELAY,
        }
    }

    /// Wait `delay` between two geocoding requests. Never less than [`MIN_GEOCODE_DELAY`].
    pub fn with_geocode_delay(mut self, delay: Duration) -> Self {
        self.geocode_delay = delay.max(MIN_GEOCODE_DELAY);
        self
    }

    /// Get the page markup from the council server.
    async fn get_page(&self) -> Result<String, ScrapeError> {
        let fetch_error = |source| ScrapeError::Fetch {
            url: self.url.clone(),
            source,
        };
        let response = self.client.get(&self.url).send().await.map_err(fetch_error)?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ScrapeError::UnexpectedStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(fetch_error)?;
        let html = String::from_utf8(body.to_vec()).map_err(|err| ScrapeError::Parse {
            url: self.url.clone(),
            reason: err.to_string(),
        })?;
        if html.trim().is_empty() {
            return Err(ScrapeError::Parse {
                url: self.url.clone(),
                reason: String::from("empty document"),
            });
        }
        Ok(html)
    }

    /// Geocode the locations one after another. Failures leave a location at (0, 0).
    async fn geocode_all(&self, locations: &mut [SkipLocation]) {
        for (index, location) in locations.iter_mut().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.geocode_delay).await;
            }
            match self.geocoder.geocode(&location.postcode).await {
                Ok(coordinate) => location.set_coordinate(coordinate),
                Err(err) => warn!(postcode = %location.postcode, error = %err, "failed to geocode"),
            }
        }
    }
}

#[async_trait]
impl Scraper for CouncilScraper {
    async fn fetch(&self) -> Result<Vec<SkipLocation>, ScrapeError> {
        info!(url = %self.url, "fetching skip locations from council website");
        let html = self.get_page().await?;
        let today = Utc::now().date_naive();
        let parsed = page_parser::parse(&html, today.year());
        debug!(count = parsed.len(), "parsed skip locations");
        let mut locations = upcoming(parsed, today);
        info!(count = locations.len(), "geocoding upcoming skip locations");
        self.geocode_all(&mut locations).await;
        info!("geocoding complete");
        Ok(locations)
    }
}

/// Drop the locations before `today`. Today's skips are kept, they may still be open.
pub fn upcoming(locations: Vec<SkipLocation>, today: NaiveDate) -> Vec<SkipLocation> {
    locations
        .into_iter()
        .filter(|location| location.date >= today)
        .collect()
}
