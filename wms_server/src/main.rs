//! This binary serves Wandsworth's mega skip days.
//!
//! `/api/skips` lists the upcoming sites as JSON, `/calendar.ics` is a feed of all skip days and
//! `/calendar/<postcode>.ics` locates each skip day at the site nearest to the postcode.

mod config;
mod route;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wms_core::{CouncilScraper, Geocoder, LocationService};

use crate::{config::Config, route::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    info!(?config, "configuration loaded");

    let client = wms_core::http_client()?;
    let geocoder = Geocoder::new(client.clone(), &config.geocoder_url);
    let scraper = CouncilScraper::new(client.clone(), &config.council_url, geocoder.clone())
        .with_geocode_delay(config.geocode_delay());
    let locations = LocationService::new(
        config.build_cache(client),
        Arc::new(scraper),
        config.cache_ttl(),
    );
    let app = route::router(AppState {
        locations: Arc::new(locations),
        geocoder,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server starting");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("received shutdown signal, starting graceful shutdown");
}
