//! Music genre to book genre mapping.
//!
//! At startup every music genre in the vocabulary is paired with the book
//! genre whose embedding is most similar. At request time a song's free-text
//! tags are resolved to a book genre: exact vocabulary hits first, then the
//! closest vocabulary genre by embedding similarity.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AppError, AppResult};

use super::embedding::{Embedder, Embedding};
use super::similarity::{argmax_row, cosine_similarity};

pub const MUSIC_GENRES: &[&str] = &[
    "rock",
    "pop",
    "hip hop",
    "rap",
    "electronic",
    "classical",
    "jazz",
    "indie",
    "folk",
    "metal",
    "punk",
    "r&b",
    "soul",
    "blues",
    "country",
    "alternative",
    "ambient",
    "dance",
    "disco",
    "funk",
    "reggae",
];

pub const BOOK_GENRES: &[&str] = &[
    "thriller",
    "mystery",
    "romance",
    "science fiction",
    "fantasy",
    "historical fiction",
    "biography",
    "self-help",
    "horror",
    "adventure",
    "literary fiction",
    "young adult",
    "dystopian",
    "memoir",
    "poetry",
    "philosophy",
    "psychology",
    "crime",
    "drama",
    "comedy",
    "classic",
];

/// A fuzzy candidate must score strictly above this to be used
pub const SIMILARITY_BASELINE: f32 = -1.0;

/// Best fuzzy match of a tag against the music vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub tag: String,
    pub music_genre: String,
    pub similarity: f32,
}

/// Immutable music-to-book genre mapping shared by all requests
pub struct GenreMapper {
    embedder: Arc<dyn Embedder>,
    music_genres: Vec<String>,
    music_embeddings: Vec<Embedding>,
    mapping: HashMap<String, String>,
    default_genre: String,
}

impl std::fmt::Debug for GenreMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenreMapper")
            .field("music_genres", &self.music_genres)
            .field("mapping", &self.mapping)
            .field("default_genre", &self.default_genre)
            .finish()
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

impl GenreMapper {
    /// Builds the mapping over the built-in vocabularies
    pub fn with_default_vocabulary(
        embedder: Arc<dyn Embedder>,
        default_genre: impl Into<String>,
    ) -> AppResult<Self> {
        Self::build(embedder, MUSIC_GENRES, BOOK_GENRES, default_genre)
    }

    /// Pairs each music genre with its most similar book genre
    ///
    /// Music labels are normalized to lowercase and deduplicated keeping the
    /// first occurrence. Both vocabularies must be non-empty.
    pub fn build(
        embedder: Arc<dyn Embedder>,
        music_vocabulary: &[&str],
        book_vocabulary: &[&str],
        default_genre: impl Into<String>,
    ) -> AppResult<Self> {
        let mut music_genres: Vec<String> = Vec::with_capacity(music_vocabulary.len());
        for label in music_vocabulary.iter().map(|l| normalize(l)) {
            if !label.is_empty() && !music_genres.contains(&label) {
                music_genres.push(label);
            }
        }

        let book_genres: Vec<String> = book_vocabulary
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        if music_genres.is_empty() || book_genres.is_empty() {
            return Err(AppError::Internal(
                "Genre vocabularies must not be empty".to_string(),
            ));
        }

        let music_refs: Vec<&str> = music_genres.iter().map(String::as_str).collect();
        let book_refs: Vec<&str> = book_genres.iter().map(String::as_str).collect();

        let music_embeddings = embedder.embed(&music_refs)?;
        let book_embeddings = embedder.embed(&book_refs)?;

        if music_embeddings.len() != music_genres.len()
            || book_embeddings.len() != book_genres.len()
        {
            return Err(AppError::Internal(format!(
                "Embedder returned {} music and {} book vectors for {} and {} labels",
                music_embeddings.len(),
                book_embeddings.len(),
                music_genres.len(),
                book_genres.len()
            )));
        }

        let similarity = cosine_similarity(&music_embeddings, &book_embeddings);

        let mut mapping = HashMap::with_capacity(music_genres.len());
        for (i, music_genre) in music_genres.iter().enumerate() {
            // A finite row always has a maximum; index 0 covers an all-NaN row
            let best = argmax_row(&similarity, i).unwrap_or(0);
            tracing::debug!(
                music_genre = %music_genre,
                book_genre = %book_genres[best],
                "Genre mapped"
            );
            mapping.insert(music_genre.clone(), book_genres[best].clone());
        }

        tracing::info!(mappings = mapping.len(), "Genre mapping built");

        Ok(Self {
            embedder,
            music_genres,
            music_embeddings,
            mapping,
            default_genre: default_genre.into(),
        })
    }

    pub fn mapping(&self) -> &HashMap<String, String> {
        &self.mapping
    }

    pub fn music_genres(&self) -> &[String] {
        &self.music_genres
    }

    pub fn default_genre(&self) -> &str {
        &self.default_genre
    }

    /// Case-insensitive exact lookup against the music vocabulary
    ///
    /// Surrounding whitespace is significant: a padded tag is not a direct
    /// hit and falls through to fuzzy matching.
    pub fn lookup_direct(&self, label: &str) -> Option<&str> {
        self.mapping.get(&label.to_lowercase()).map(String::as_str)
    }

    /// Resolves a song's tags to a book genre
    ///
    /// Empty tags give the default genre. Otherwise the first tag, in the
    /// given order, that is a vocabulary genre decides. Failing that, the
    /// single best tag/genre pair by embedding similarity decides, and the
    /// default is used if no tag could be compared at all.
    pub fn resolve(&self, tags: &[String]) -> AppResult<String> {
        if tags.is_empty() {
            tracing::debug!(book_genre = %self.default_genre, "No tags, using default genre");
            return Ok(self.default_genre.clone());
        }

        if let Some((tag, book_genre)) = tags
            .iter()
            .find_map(|tag| self.lookup_direct(tag).map(|genre| (tag, genre)))
        {
            tracing::debug!(tag = %tag, book_genre = %book_genre, "Direct genre match");
            return Ok(book_genre.to_string());
        }

        match self.fuzzy_match(tags)? {
            Some(found) => {
                let book_genre = self.mapping[&found.music_genre].clone();
                tracing::debug!(
                    tag = %found.tag,
                    music_genre = %found.music_genre,
                    similarity = found.similarity,
                    book_genre = %book_genre,
                    "Fuzzy genre match"
                );
                Ok(book_genre)
            }
            None => {
                tracing::debug!(book_genre = %self.default_genre, "No comparable tags, using default genre");
                Ok(self.default_genre.clone())
            }
        }
    }

    /// Global best (tag, music genre) pair by cosine similarity
    ///
    /// Blank tags are ignored. Ties keep the earliest tag and genre.
    pub fn fuzzy_match(&self, tags: &[String]) -> AppResult<Option<FuzzyMatch>> {
        let normalized: Vec<String> = tags
            .iter()
            .map(|t| normalize(t))
            .filter(|t| !t.is_empty())
            .collect();

        if normalized.is_empty() {
            return Ok(None);
        }

        let refs: Vec<&str> = normalized.iter().map(String::as_str).collect();
        let tag_embeddings = self.embedder.embed(&refs)?;
        let similarity = cosine_similarity(&tag_embeddings, &self.music_embeddings);

        let mut best: Option<FuzzyMatch> = None;
        let mut best_score = SIMILARITY_BASELINE;

        for (row, tag) in normalized.iter().enumerate().take(similarity.len()) {
            let Some(col) = argmax_row(&similarity, row) else {
                continue;
            };
            let score = similarity[row][col];
            if score > best_score {
                best_score = score;
                best = Some(FuzzyMatch {
                    tag: tag.clone(),
                    music_genre: self.music_genres[col].clone(),
                    similarity: score,
                });
            }
        }

        Ok(best)
    }
}
