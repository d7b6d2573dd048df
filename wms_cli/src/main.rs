use std::{env::current_dir, fs::write, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wms_core::{
    calendar, geocoder, postcode, scrape, CouncilScraper, Geocoder, Scraper, ValidationError,
};

#[derive(Debug, Parser)]
pub struct Arguments {
    /// locate each skip day at the site nearest to this postcode
    #[arg(long)]
    pub postcode: Option<String>,
    /// where to write the feed, defaults to megaskip.ics in the current directory
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// the council page listing the skip days
    #[arg(long, default_value = scrape::DEFAULT_URL)]
    pub council_url: String,
    /// the Nominatim instance used for geocoding
    #[arg(long, default_value = geocoder::DEFAULT_URL)]
    pub geocoder_url: String,
    /// the pause between two geocoding requests in milliseconds, at least 200
    #[arg(long, default_value_t = 200)]
    pub geocode_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Arguments::parse();

    let client = wms_core::http_client()?;
    let geocoder = Geocoder::new(client.clone(), &args.geocoder_url);
    let user = match &args.postcode {
        Some(raw) => {
            let postcode = postcode::normalize(raw)
                .ok_or_else(|| ValidationError::InvalidPostcode(raw.clone()))?;
            let coordinate = geocoder
                .geocode(&postcode)
                .await
                .with_context(|| format!("could not find the location of {postcode}"))?;
            Some(coordinate)
        }
        None => None,
    };

    let scraper = CouncilScraper::new(client, &args.council_url, geocoder)
        .with_geocode_delay(Duration::from_millis(args.geocode_delay_ms));
    let locations = scraper.fetch().await?;
    info!(count = locations.len(), "scraped skip locations");

    let path = match args.output {
        Some(path) => path,
        None => {
            let mut path = current_dir()?;
            path.push("megaskip.ics");
            path
        }
    };
    write(&path, calendar::build_feed(&locations, user))?;
    info!(path = %path.display(), "wrote calendar");
    Ok(())
}
