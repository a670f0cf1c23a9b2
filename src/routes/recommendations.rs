use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::RecommendationResponse,
    routes::{extract::ApiQuery, AppState},
    services::DEFAULT_MAX_RESULTS,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    max_results: Option<u32>,
}

/// Handler for book recommendations for a saved song
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(song_id): Path<String>,
    ApiQuery(params): ApiQuery<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let max_results = params.max_results.unwrap_or(DEFAULT_MAX_RESULTS);

    tracing::info!(
        request_id = %request_id,
        song_id = %song_id,
        max_results,
        "Recommendation request"
    );

    let response = state
        .recommendations
        .recommend(&song_id, max_results)
        .await?;
    Ok(Json(response))
}
