use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// MongoDB connection URL
    #[serde(default = "default_mongo_url")]
    pub mongo_url: String,

    /// MongoDB database holding songs and users
    #[serde(default = "default_mongo_database")]
    pub mongo_database: String,

    /// Collection of saved songs
    #[serde(default = "default_songs_collection")]
    pub songs_collection: String,

    /// Collection of registered users
    #[serde(default = "default_users_collection")]
    pub users_collection: String,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Last.fm API key
    pub lastfm_api_key: String,

    /// Last.fm API base URL
    #[serde(default = "default_lastfm_api_url")]
    pub lastfm_api_url: String,

    /// Google Books volumes endpoint
    #[serde(default = "default_google_books_api_url")]
    pub google_books_api_url: String,

    /// Optional Google Books API key
    #[serde(default)]
    pub google_books_api_key: Option<String>,

    /// HS256 secret for access tokens
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,

    /// Timeout applied to every outbound HTTP request
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Timeout applied to every Redis and MongoDB operation
    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,

    /// Largest song batch accepted by `POST /songs`
    #[serde(default = "default_max_song_batch")]
    pub max_song_batch: usize,

    /// Where the embedding model is downloaded and cached
    #[serde(default)]
    pub embedding_cache_dir: Option<PathBuf>,

    /// Book genre used when a song's tags resolve to nothing
    #[serde(default = "default_book_genre")]
    pub default_book_genre: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_mongo_url() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_mongo_database() -> String {
    "music_book_db".to_string()
}

fn default_songs_collection() -> String {
    "playlists".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_lastfm_api_url() -> String {
    "http://ws.audioscrobbler.com/2.0/".to_string()
}

fn default_google_books_api_url() -> String {
    "https://www.googleapis.com/books/v1/volumes".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    720
}

fn default_http_timeout_secs() -> u64 {
    5
}

fn default_store_timeout_secs() -> u64 {
    5
}

fn default_max_song_batch() -> usize {
    100
}

pub fn default_book_genre() -> String {
    "fiction".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
