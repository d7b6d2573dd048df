use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::error;
use wms_core::SkipLocation;

use crate::route::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    error: &'static str,
}

/// List the upcoming skip locations.
pub async fn handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkipLocation>>, (StatusCode, Json<ErrorBody>)> {
    let locations = state.locations.get_locations().await.map_err(|err| {
        error!(error = %err, "failed to get skip locations");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "Failed to fetch skip locations",
            }),
        )
    })?;
    Ok(Json(locations))
}
