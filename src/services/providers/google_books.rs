//! Google Books catalog provider
//!
//! Searches volumes with a `subject:` query ordered by relevance and converts
//! each volume into a [`Book`]. Results are cached per subject and page size.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Book, GoogleVolumes},
    services::providers::{
        build_http_client, request_failed, unexpected_status, BookCatalog, MAX_CATALOG_RESULTS,
    },
};

const PROVIDER: &str = "Google Books";
const BOOK_CACHE_TTL: u64 = 3600; // 1 hour

#[derive(Clone)]
pub struct GoogleBooksCatalog {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
    cache: Cache,
}

impl GoogleBooksCatalog {
    pub fn new(
        cache: Cache,
        api_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            api_url,
            api_key,
            cache,
        })
    }

    /// Query parameters for a subject search
    fn query_params(&self, genre: &str, max_results: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", format!("subject:{}", genre)),
            ("maxResults", max_results.to_string()),
            ("orderBy", "relevance".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }
        params
    }

    async fn fetch_volumes(&self, genre: &str, max_results: u32) -> AppResult<Vec<Book>> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&self.query_params(genre, max_results))
            .send()
            .await
            .map_err(|e| request_failed(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(unexpected_status(PROVIDER, response).await);
        }

        let volumes: GoogleVolumes = response
            .json()
            .await
            .map_err(|e| request_failed(PROVIDER, e))?;

        let books: Vec<Book> = volumes
            .items
            .into_iter()
            .take(max_results as usize)
            .map(Book::from)
            .collect();

        tracing::info!(
            genre = %genre,
            results = books.len(),
            provider = "google_books",
            "Book search completed"
        );

        Ok(books)
    }
}

/// Checks a subject search before it goes upstream
pub fn validate_search(genre: &str, max_results: u32) -> AppResult<()> {
    if genre.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Book genre cannot be empty".to_string(),
        ));
    }
    if max_results == 0 || max_results > MAX_CATALOG_RESULTS {
        return Err(AppError::InvalidInput(format!(
            "max_results must be between 1 and {}",
            MAX_CATALOG_RESULTS
        )));
    }
    Ok(())
}

#[async_trait::async_trait]
impl BookCatalog for GoogleBooksCatalog {
    async fn search_by_subject(&self, genre: &str, max_results: u32) -> AppResult<Vec<Book>> {
        validate_search(genre, max_results)?;

        cached!(
            self.cache,
            CacheKey::BookSearch {
                genre: genre.to_string(),
                max_results,
            },
            BOOK_CACHE_TTL,
            async move { self.fetch_volumes(genre, max_results).await }
        )
    }

    fn name(&self) -> &'static str {
        "google_books"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;

    fn create_test_catalog(api_key: Option<&str>) -> (GoogleBooksCatalog, crate::db::CacheWriterHandle) {
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, handle) = Cache::new(client, Duration::from_secs(1));
        let catalog = GoogleBooksCatalog::new(
            cache,
            "http://test.local/books/v1/volumes".to_string(),
            api_key.map(str::to_string),
            Duration::from_secs(1),
        )
        .unwrap();
        (catalog, handle)
    }

    #[tokio::test]
    async fn test_query_params_without_key() {
        let (catalog, _handle) = create_test_catalog(None);
        let params = catalog.query_params("literary fiction", 3);

        assert_eq!(
            params,
            vec![
                ("q", "subject:literary fiction".to_string()),
                ("maxResults", "3".to_string()),
                ("orderBy", "relevance".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_query_params_with_key() {
        let (catalog, _handle) = create_test_catalog(Some("secret"));
        let params = catalog.query_params("poetry", 5);
        assert!(params.contains(&("key", "secret".to_string())));
    }

    #[test]
    fn test_validate_search_bounds() {
        assert!(validate_search("poetry", 1).is_ok());
        assert!(validate_search("poetry", MAX_CATALOG_RESULTS).is_ok());
        assert!(matches!(
            validate_search("poetry", 0),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_search("poetry", MAX_CATALOG_RESULTS + 1),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_search("  ", 5),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_upstream_error() {
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, _handle) = Cache::new(client, Duration::from_secs(1));
        let catalog = GoogleBooksCatalog::new(
            cache,
            "http://127.0.0.1:1/books/v1/volumes".to_string(),
            None,
            Duration::from_secs(1),
        )
        .unwrap();

        let result = catalog.search_by_subject("poetry", 3).await;
        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
    }
}
