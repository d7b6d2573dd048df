pub mod calendar;
pub mod skips;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use wms_core::{Geocoder, LocationService};

#[derive(Clone)]
pub struct AppState {
    pub locations: Arc<LocationService>,
    pub geocoder: Geocoder,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/skips", get(skips::handler))
        .route("/calendar.ics", get(calendar::handler))
        .route("/calendar/{file}", get(calendar::postcode_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
