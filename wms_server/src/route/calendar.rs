use axum::{
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
};
use tracing::{error, warn};
use wms_core::{calendar, postcode, Coordinate, SkipLocation, ValidationError};

use crate::route::AppState;

/// Handle requests for the feed of all skip days.
pub async fn handler(State(state): State<AppState>) -> Result<Response, (StatusCode, String)> {
    let locations = get_locations(&state).await?;
    Ok(feed_response(&locations, None))
}

/// Handle requests for the feed located at the sites nearest to a postcode.
///
/// The postcode is the path segment before `.ics`, e.g. `/calendar/SW11%205TU.ics`.
pub async fn postcode_handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let postcode =
        postcode_from_file(&file).map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
    let user = state.geocoder.geocode(&postcode).await.map_err(|err| {
        warn!(postcode, error = %err, "failed to geocode requested postcode");
        (
            StatusCode::BAD_REQUEST,
            String::from("Could not find postcode location"),
        )
    })?;
    let locations = get_locations(&state).await?;
    Ok(feed_response(&locations, Some(user)))
}

async fn get_locations(state: &AppState) -> Result<Vec<SkipLocation>, (StatusCode, String)> {
    state.locations.get_locations().await.map_err(|err| {
        error!(error = %err, "failed to get skip locations");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("Failed to generate calendar"),
        )
    })
}

fn feed_response(locations: &[SkipLocation], user: Option<Coordinate>) -> Response {
    (
        [
            (CONTENT_TYPE, String::from("text/calendar; charset=utf-8")),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", calendar::FILENAME),
            ),
        ],
        calendar::build_feed(locations, user),
    )
        .into_response()
}

/// Extract the normalized postcode from a `<postcode>.ics` path segment.
///
/// A `+` counts as a space, like in form encoding.
fn postcode_from_file(file: &str) -> Result<String, ValidationError> {
    let raw = file
        .strip_suffix(".ics")
        .ok_or_else(|| ValidationError::InvalidPath(file.to_string()))?
        .replace('+', " ");
    if !postcode::is_valid(&raw) {
        return Err(ValidationError::InvalidPostcode(raw));
    }
    postcode::normalize(&raw).ok_or(ValidationError::InvalidPostcode(raw))
}
