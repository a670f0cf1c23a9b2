use serde::{Deserialize, Serialize};

/// A book recommendation returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub google_books_id: Option<String>,
}

/// Books recommended for a song, with the genres that produced them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub music_genre: String,
    pub mapped_book_genre: String,
    pub recommendations: Vec<Book>,
}

// ============================================================================
// Google Books API Types
// ============================================================================

/// Raw volume search response from the Google Books API
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GoogleVolumes {
    #[serde(default)]
    pub items: Vec<GoogleVolume>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoogleVolume {
    pub id: Option<String>,
    #[serde(default)]
    pub volume_info: GoogleVolumeInfo,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoogleVolumeInfo {
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub image_links: Option<GoogleImageLinks>,
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GoogleImageLinks {
    pub thumbnail: Option<String>,
}

impl From<GoogleVolume> for Book {
    fn from(volume: GoogleVolume) -> Self {
        let info = volume.volume_info;

        Book {
            title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
            author: info
                .authors
                .into_iter()
                .next()
                .unwrap_or_else(|| "Unknown Author".to_string()),
            description: Some(
                info.description
                    .unwrap_or_else(|| "No description available".to_string()),
            ),
            cover_url: info.image_links.and_then(|links| links.thumbnail),
            rating: info.average_rating,
            genres: info.categories,
            google_books_id: volume.id,
        }
    }
}
