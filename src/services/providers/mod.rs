//! External catalog providers
//!
//! Book recommendations come from a book catalog searched by subject; song
//! metadata and tags come from a music catalog. Each sits behind a trait so
//! handlers and services can run against fakes.
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::{Book, TrackMetadata},
};

pub mod google_books;
pub mod lastfm;

pub use google_books::GoogleBooksCatalog;
pub use lastfm::LastFmClient;

/// Largest page the book catalog will return for one query
pub const MAX_CATALOG_RESULTS: u32 = 40;

/// Book search by subject
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait BookCatalog: Send + Sync {
    /// Up to `max_results` books for a subject, in the catalog's relevance order
    ///
    /// An empty result is a success. Transport failures, timeouts and non-2xx
    /// responses are `UpstreamUnavailable`.
    async fn search_by_subject(&self, genre: &str, max_results: u32) -> AppResult<Vec<Book>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Track metadata lookup by artist and title
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TrackMetadataProvider: Send + Sync {
    /// Metadata and tags for a track; `NotFound` if the catalog has no such track
    async fn track_info(&self, artist: &str, track: &str) -> AppResult<TrackMetadata>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// HTTP client shared by providers, bounded by `timeout` per request
pub fn build_http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(client)
}

/// Maps a transport failure to an upstream error
pub(crate) fn request_failed(provider: &str, error: reqwest::Error) -> AppError {
    tracing::error!(provider = provider, error = %error, "Upstream request failed");

    if error.is_timeout() {
        AppError::UpstreamUnavailable(format!("{} request timed out", provider))
    } else {
        AppError::UpstreamUnavailable(format!("Error contacting {}: {}", provider, error))
    }
}

/// Maps a non-2xx response to an upstream error
pub(crate) async fn unexpected_status(provider: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    tracing::error!(
        provider = provider,
        status = %status,
        body = %body,
        "Upstream returned an error status"
    );

    AppError::UpstreamUnavailable(format!("{} returned status {}", provider, status))
}
