//! Last.fm track metadata provider
//!
//! Uses `track.getInfo` to fetch a track's canonical name, album, play
//! statistics and top tags. Tags feed the book genre resolution later on.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::TrackMetadata,
    services::providers::{build_http_client, request_failed, TrackMetadataProvider},
};

const PROVIDER: &str = "Last.fm";
const TRACK_CACHE_TTL: u64 = 86400; // 1 day

/// Last.fm error code for an unknown track
const LASTFM_INVALID_PARAMETERS: i64 = 6;

#[derive(Clone)]
pub struct LastFmClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

#[derive(Debug, Deserialize, Default)]
struct TrackInfoResponse {
    track: Option<LastFmTrack>,
    error: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct LastFmTrack {
    name: Option<String>,
    artist: Option<LastFmNamed>,
    album: Option<LastFmAlbum>,
    listeners: Option<Value>,
    playcount: Option<Value>,
    toptags: Option<Value>,
    url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct LastFmNamed {
    name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct LastFmAlbum {
    title: Option<String>,
}

/// Counts arrive as strings ("12345") but are accepted as numbers too
fn parse_count(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Tag names from `toptags.tag`, which is an array, a lone object, or absent
fn tag_names(toptags: Option<&Value>) -> Vec<String> {
    let tag_name = |tag: &Value| tag.get("name").and_then(Value::as_str).map(str::to_string);

    match toptags.and_then(|t| t.get("tag")) {
        Some(Value::Array(tags)) => tags.iter().filter_map(tag_name).collect(),
        Some(tag) if tag.is_object() => tag_name(tag).into_iter().collect(),
        _ => Vec::new(),
    }
}

impl From<LastFmTrack> for TrackMetadata {
    fn from(track: LastFmTrack) -> Self {
        TrackMetadata {
            name: track.name.unwrap_or_else(|| "Unknown".to_string()),
            artist: track
                .artist
                .and_then(|a| a.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            album: track.album.and_then(|a| a.title),
            listeners: parse_count(track.listeners.as_ref()),
            playcount: parse_count(track.playcount.as_ref()),
            tags: tag_names(track.toptags.as_ref()),
            url: track.url,
        }
    }
}

/// Interprets a decoded `track.getInfo` body
fn interpret(body: TrackInfoResponse) -> AppResult<TrackMetadata> {
    match (body.track, body.error) {
        (Some(track), _) => Ok(TrackMetadata::from(track)),
        (None, Some(LASTFM_INVALID_PARAMETERS)) | (None, None) => {
            Err(AppError::NotFound("Track not found".to_string()))
        }
        (None, Some(code)) => Err(AppError::UpstreamUnavailable(format!(
            "{} error {}: {}",
            PROVIDER,
            code,
            body.message.unwrap_or_default()
        ))),
    }
}

impl LastFmClient {
    pub fn new(cache: Cache, api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            api_key,
            api_url,
            cache,
        })
    }

    async fn fetch_track_info(&self, artist: &str, track: &str) -> AppResult<TrackMetadata> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[
                ("method", "track.getInfo"),
                ("api_key", self.api_key.as_str()),
                ("artist", artist),
                ("track", track),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| request_failed(PROVIDER, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| request_failed(PROVIDER, e))?;

        // Last.fm reports unknown tracks as an error body, sometimes with a 4xx
        let body: TrackInfoResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                status = %status,
                error = %e,
                response = %text,
                "Failed to parse Last.fm response"
            );
            AppError::UpstreamUnavailable(format!("{} returned status {}", PROVIDER, status))
        })?;

        let metadata = interpret(body)?;

        tracing::info!(
            artist = %artist,
            track = %track,
            tags = metadata.tags.len(),
            provider = "lastfm",
            "Track metadata fetched"
        );

        Ok(metadata)
    }
}

#[async_trait::async_trait]
impl TrackMetadataProvider for LastFmClient {
    async fn track_info(&self, artist: &str, track: &str) -> AppResult<TrackMetadata> {
        if artist.trim().is_empty() || track.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Artist and track are required".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::TrackInfo {
                artist: artist.to_string(),
                track: track.to_string(),
            },
            TRACK_CACHE_TTL,
            async move { self.fetch_track_info(artist, track).await }
        )
    }

    fn name(&self) -> &'static str {
        "lastfm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> AppResult<TrackMetadata> {
        interpret(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_full_track_info() {
        let metadata = decode(
            r#"{
                "track": {
                    "name": "Creep",
                    "url": "https://www.last.fm/music/Radiohead/_/Creep",
                    "listeners": "1734002",
                    "playcount": "14830412",
                    "artist": { "name": "Radiohead" },
                    "album": { "title": "Pablo Honey" },
                    "toptags": { "tag": [
                        { "name": "alternative", "url": "x" },
                        { "name": "rock", "url": "y" }
                    ]}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(metadata.name, "Creep");
        assert_eq!(metadata.artist, "Radiohead");
        assert_eq!(metadata.album.as_deref(), Some("Pablo Honey"));
        assert_eq!(metadata.listeners, Some(1_734_002));
        assert_eq!(metadata.playcount, Some(14_830_412));
        assert_eq!(metadata.tags, vec!["alternative", "rock"]);
        assert_eq!(
            metadata.url.as_deref(),
            Some("https://www.last.fm/music/Radiohead/_/Creep")
        );
    }

    #[test]
    fn test_single_tag_object() {
        let metadata = decode(
            r#"{"track": {"name": "Song", "artist": {"name": "A"},
                "toptags": {"tag": {"name": "jazz"}}}}"#,
        )
        .unwrap();
        assert_eq!(metadata.tags, vec!["jazz"]);
    }

    #[test]
    fn test_sparse_track_defaults() {
        let metadata = decode(r#"{"track": {"toptags": ""}}"#).unwrap();
        assert_eq!(metadata.name, "Unknown");
        assert_eq!(metadata.artist, "Unknown");
        assert_eq!(metadata.album, None);
        assert_eq!(metadata.listeners, None);
        assert!(metadata.tags.is_empty());
    }

    #[test]
    fn test_unknown_track_is_not_found() {
        let result = decode(r#"{"error": 6, "message": "Track not found"}"#);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_other_error_is_upstream() {
        let result = decode(r#"{"error": 10, "message": "Invalid API key"}"#);
        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
    }

    #[test]
    fn test_parse_count_variants() {
        assert_eq!(parse_count(Some(&Value::from("42"))), Some(42));
        assert_eq!(parse_count(Some(&Value::from(7))), Some(7));
        assert_eq!(parse_count(Some(&Value::from(""))), None);
        assert_eq!(parse_count(Some(&Value::from("n/a"))), None);
        assert_eq!(parse_count(None), None);
    }
}
