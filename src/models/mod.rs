pub mod book;
pub mod song;
pub mod user;

pub use book::{Book, GoogleVolume, GoogleVolumes, RecommendationResponse};
pub use song::{
    AddSongsResponse, FailedSong, NewSong, SongDocument, SongResponse, TrackMetadata, UpdateSong,
};
pub use user::{Claims, LoginRequest, RegisterRequest, TokenResponse, UserDocument};
