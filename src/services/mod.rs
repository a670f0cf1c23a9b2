pub mod auth;
pub mod embedding;
pub mod genre_mapper;
pub mod providers;
pub mod recommendations;
pub mod similarity;
pub mod songs;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::AuthService;
pub use embedding::{Embedder, Embedding, FastEmbedder};
pub use genre_mapper::GenreMapper;
pub use providers::{BookCatalog, GoogleBooksCatalog, LastFmClient, TrackMetadataProvider};
pub use recommendations::{RecommendationService, DEFAULT_MAX_RESULTS};
pub use songs::SongService;
