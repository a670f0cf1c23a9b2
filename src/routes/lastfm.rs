use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::TrackMetadata,
    routes::{extract::ApiQuery, AppState},
};

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    artist: String,
    track: String,
}

/// Handler for raw track metadata lookups
pub async fn track_metadata(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<TrackQuery>,
) -> AppResult<Json<TrackMetadata>> {
    let metadata = state
        .track_metadata
        .track_info(&params.artist, &params.track)
        .await?;
    Ok(Json(metadata))
}
