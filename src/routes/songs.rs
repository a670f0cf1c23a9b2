use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{AddSongsResponse, SongResponse, UpdateSong},
    routes::{extract::ApiJson, AppState},
};

/// Looks up and stores a batch of `{title, artist}` entries
pub async fn add_songs(
    State(state): State<Arc<AppState>>,
    ApiJson(entries): ApiJson<Vec<Value>>,
) -> AppResult<Json<AddSongsResponse>> {
    let response = state.songs.add_songs(entries).await?;
    Ok(Json(response))
}

pub async fn list_songs(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let songs = state.songs.list_songs().await?;
    Ok(Json(json!({ "songs": songs })))
}

pub async fn get_song(
    State(state): State<Arc<AppState>>,
    Path(song_id): Path<String>,
) -> AppResult<Json<SongResponse>> {
    let song = state.songs.get_song(&song_id).await?;
    Ok(Json(song))
}

pub async fn update_song(
    State(state): State<Arc<AppState>>,
    Path(song_id): Path<String>,
    ApiJson(update): ApiJson<UpdateSong>,
) -> AppResult<Json<Value>> {
    state.songs.update_song(&song_id, update).await?;
    Ok(Json(json!({ "message": "Song updated successfully" })))
}

pub async fn delete_song(
    State(state): State<Arc<AppState>>,
    Path(song_id): Path<String>,
) -> AppResult<Json<Value>> {
    state.songs.delete_song(&song_id).await?;
    Ok(Json(json!({ "message": "Song deleted successfully" })))
}
