use std::sync::Arc;

use tracing::instrument;

use crate::{
    db::SongStore,
    error::{AppError, AppResult},
    models::RecommendationResponse,
    services::{
        genre_mapper::GenreMapper,
        providers::{BookCatalog, MAX_CATALOG_RESULTS},
    },
};

/// Page size used when the caller does not ask for one
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// Reported music genre for a song without tags
pub const UNKNOWN_MUSIC_GENRE: &str = "Unknown";

/// Recommends books for a saved song
///
/// The song's tags are resolved to a book genre through the shared
/// [`GenreMapper`], and the catalog is searched for that genre. Books are
/// returned in the catalog's relevance order.
#[derive(Clone)]
pub struct RecommendationService {
    songs: Arc<dyn SongStore>,
    catalog: Arc<dyn BookCatalog>,
    mapper: Arc<GenreMapper>,
}

impl RecommendationService {
    pub fn new(
        songs: Arc<dyn SongStore>,
        catalog: Arc<dyn BookCatalog>,
        mapper: Arc<GenreMapper>,
    ) -> Self {
        Self {
            songs,
            catalog,
            mapper,
        }
    }

    #[instrument(skip(self))]
    pub async fn recommend(
        &self,
        song_id: &str,
        max_results: u32,
    ) -> AppResult<RecommendationResponse> {
        if max_results == 0 || max_results > MAX_CATALOG_RESULTS {
            return Err(AppError::InvalidInput(format!(
                "max_results must be between 1 and {}",
                MAX_CATALOG_RESULTS
            )));
        }

        let song = self
            .songs
            .find_by_id(song_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Song not found".to_string()))?;

        let tags = song.tags().to_vec();
        let book_genre = self.resolve_genre(tags.clone()).await?;
        let music_genre = source_genre(&self.mapper, &tags, &book_genre);

        tracing::info!(
            song_id = %song_id,
            music_genre = %music_genre,
            book_genre = %book_genre,
            catalog = self.catalog.name(),
            "Resolved book genre"
        );

        let books = self
            .catalog
            .search_by_subject(&book_genre, max_results)
            .await?;

        Ok(RecommendationResponse {
            music_genre,
            mapped_book_genre: book_genre,
            recommendations: books,
        })
    }

    /// Runs resolution off the async runtime since fuzzy matching embeds text
    async fn resolve_genre(&self, tags: Vec<String>) -> AppResult<String> {
        let mapper = self.mapper.clone();
        tokio::task::spawn_blocking(move || mapper.resolve(&tags))
            .await
            .map_err(|e| AppError::Internal(format!("Genre resolution task failed: {}", e)))?
    }
}

/// Music genre reported alongside a resolved book genre
///
/// The first tag, in stored order, that maps directly to `book_genre`. When no
/// tag does (fuzzy or default resolution) the first tag is reported, and
/// "Unknown" when the song has no tags.
pub fn source_genre(mapper: &GenreMapper, tags: &[String], book_genre: &str) -> String {
    tags.iter()
        .find(|tag| mapper.lookup_direct(tag) == Some(book_genre))
        .or_else(|| tags.first())
        .cloned()
        .unwrap_or_else(|| UNKNOWN_MUSIC_GENRE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::songs::MockSongStore;
    use crate::models::{Book, SongDocument};
    use crate::services::providers::MockBookCatalog;
    use crate::services::test_support::FakeEmbedder;

    const SONG_ID: &str = "507f1f77bcf86cd799439011";

    fn mapper() -> Arc<GenreMapper> {
        let embedder = FakeEmbedder::default()
            .pin("indie", 0)
            .pin("literary fiction", 0)
            .pin("rock", 1)
            .pin("adventure", 1)
            .pin("alternative", 1);
        Arc::new(GenreMapper::with_default_vocabulary(Arc::new(embedder), "fiction").unwrap())
    }

    fn song_with_tags(tags: Option<Vec<&str>>) -> SongDocument {
        SongDocument {
            name: "Motion Picture Soundtrack".to_string(),
            artist: "Radiohead".to_string(),
            tags: tags.map(|t| t.into_iter().map(str::to_string).collect()),
            ..Default::default()
        }
    }

    fn book(title: &str) -> Book {
        Book {
            title: title.to_string(),
            author: "Author".to_string(),
            description: None,
            cover_url: None,
            rating: None,
            genres: vec![],
            google_books_id: None,
        }
    }

    fn store_returning(song: Option<SongDocument>) -> MockSongStore {
        let mut store = MockSongStore::new();
        store
            .expect_find_by_id()
            .withf(|id| id == SONG_ID)
            .times(1)
            .returning(move |_| Ok(song.clone()));
        store
    }

    #[tokio::test]
    async fn test_recommend_direct_match() {
        let store = store_returning(Some(song_with_tags(Some(vec!["indie", "sad"]))));

        let mut catalog = MockBookCatalog::new();
        catalog
            .expect_search_by_subject()
            .withf(|genre, max| genre == "literary fiction" && *max == 3)
            .times(1)
            .returning(|_, _| Ok(vec![book("Normal People"), book("Stoner")]));
        catalog.expect_name().return_const("mock");

        let service = RecommendationService::new(Arc::new(store), Arc::new(catalog), mapper());
        let response = service.recommend(SONG_ID, 3).await.unwrap();

        assert_eq!(response.music_genre, "indie");
        assert_eq!(response.mapped_book_genre, "literary fiction");
        assert_eq!(response.recommendations.len(), 2);
        assert_eq!(response.recommendations[0].title, "Normal People");
    }

    #[tokio::test]
    async fn test_recommend_without_tags_uses_default() {
        let store = store_returning(Some(song_with_tags(Some(vec![]))));

        let mut catalog = MockBookCatalog::new();
        catalog
            .expect_search_by_subject()
            .withf(|genre, _| genre == "fiction")
            .times(1)
            .returning(|_, _| Ok(vec![]));
        catalog.expect_name().return_const("mock");

        let service = RecommendationService::new(Arc::new(store), Arc::new(catalog), mapper());
        let response = service.recommend(SONG_ID, 5).await.unwrap();

        assert_eq!(response.music_genre, UNKNOWN_MUSIC_GENRE);
        assert_eq!(response.mapped_book_genre, "fiction");
        assert!(response.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_recommend_absent_tags_field_uses_default() {
        let store = store_returning(Some(song_with_tags(None)));

        let mut catalog = MockBookCatalog::new();
        catalog
            .expect_search_by_subject()
            .returning(|_, _| Ok(vec![]));
        catalog.expect_name().return_const("mock");

        let service = RecommendationService::new(Arc::new(store), Arc::new(catalog), mapper());
        let response = service.recommend(SONG_ID, 5).await.unwrap();

        assert_eq!(response.mapped_book_genre, "fiction");
        assert_eq!(response.music_genre, UNKNOWN_MUSIC_GENRE);
    }

    #[tokio::test]
    async fn test_recommend_song_not_found() {
        let store = store_returning(None);
        let mut catalog = MockBookCatalog::new();
        catalog.expect_search_by_subject().never();

        let service = RecommendationService::new(Arc::new(store), Arc::new(catalog), mapper());
        let err = service.recommend(SONG_ID, 5).await.unwrap_err();

        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "Song not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let store = store_returning(Some(song_with_tags(Some(vec!["rock"]))));

        let mut catalog = MockBookCatalog::new();
        catalog
            .expect_search_by_subject()
            .returning(|_, _| Err(AppError::UpstreamUnavailable("timed out".to_string())));
        catalog.expect_name().return_const("mock");

        let service = RecommendationService::new(Arc::new(store), Arc::new(catalog), mapper());
        let err = service.recommend(SONG_ID, 5).await.unwrap_err();

        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_max_results_out_of_range() {
        let mut store = MockSongStore::new();
        store.expect_find_by_id().never();
        let catalog = MockBookCatalog::new();

        let service = RecommendationService::new(Arc::new(store), Arc::new(catalog), mapper());

        for max in [0, MAX_CATALOG_RESULTS + 1] {
            let err = service.recommend(SONG_ID, max).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_source_genre_first_tag_mapping_to_book_genre() {
        let mapper = mapper();
        // rock and alternative both map to adventure; stored order decides
        let tags = vec![
            "sad".to_string(),
            "Alternative".to_string(),
            "rock".to_string(),
        ];
        assert_eq!(source_genre(&mapper, &tags, "adventure"), "Alternative");
    }

    #[test]
    fn test_source_genre_falls_back_to_first_tag() {
        let mapper = mapper();
        let tags = vec!["lo-fi chillhop".to_string(), "study".to_string()];
        assert_eq!(source_genre(&mapper, &tags, "memoir"), "lo-fi chillhop");
    }

    #[test]
    fn test_source_genre_unknown_without_tags() {
        let mapper = mapper();
        assert_eq!(source_genre(&mapper, &[], "fiction"), UNKNOWN_MUSIC_GENRE);
    }
}
