use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::AppResult,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{AuthService, RecommendationService, SongService, TrackMetadataProvider},
};

pub mod auth;
pub mod extract;
pub mod lastfm;
pub mod recommendations;
pub mod songs;

/// Shared application state
pub struct AppState {
    pub recommendations: RecommendationService,
    pub songs: SongService,
    pub auth: AuthService,
    pub track_metadata: Arc<dyn TrackMetadataProvider>,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(database_health))
        // Recommendations
        .route(
            "/recommendations/:song_id",
            get(recommendations::get_recommendations),
        )
        .route(
            "/api/books/recommendations/:song_id",
            get(recommendations::get_recommendations),
        )
        // Songs
        .route("/songs", get(songs::list_songs).post(songs::add_songs))
        .route(
            "/songs/:song_id",
            get(songs::get_song)
                .put(songs::update_song)
                .delete(songs::delete_song),
        )
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/protected", get(auth::protected))
        // Music catalog
        .route("/lastfm/track_metadata", get(lastfm::track_metadata))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Reports whether the song store answers a ping
async fn database_health(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    state.songs.ping().await?;
    Ok(Json(json!({ "status": "healthy", "database": "connected" })))
}
