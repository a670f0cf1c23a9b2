use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tracing::instrument;
use validator::Validate;

use crate::{
    db::SongStore,
    error::{AppError, AppResult},
    models::{AddSongsResponse, FailedSong, NewSong, SongDocument, SongResponse, UpdateSong},
    services::providers::TrackMetadataProvider,
};

/// Catalog lookups in flight at once for one batch
pub const MAX_CONCURRENT_LOOKUPS: usize = 4;

/// Saved-song management
///
/// New songs are looked up in the music catalog so their stored tags can drive
/// recommendations later.
#[derive(Clone)]
pub struct SongService {
    store: Arc<dyn SongStore>,
    metadata: Arc<dyn TrackMetadataProvider>,
    max_batch: usize,
}

/// Title and artist of a raw batch entry, for failure reports
fn entry_labels(entry: &Value) -> (Option<String>, Option<String>) {
    let field = |name: &str| entry.get(name).and_then(Value::as_str).map(str::to_string);
    (field("title"), field("artist"))
}

fn parse_entry(entry: &Value) -> AppResult<NewSong> {
    let song: NewSong = serde_json::from_value(entry.clone())
        .map_err(|e| AppError::InvalidInput(format!("Malformed song entry: {}", e)))?;
    song.validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    Ok(song)
}

impl SongService {
    pub fn new(
        store: Arc<dyn SongStore>,
        metadata: Arc<dyn TrackMetadataProvider>,
        max_batch: usize,
    ) -> Self {
        Self {
            store,
            metadata,
            max_batch,
        }
    }

    /// Looks up and stores a batch of songs
    ///
    /// Entries are handled independently, at most [`MAX_CONCURRENT_LOOKUPS`] at
    /// a time. The response keeps stored songs in submission order and lists
    /// every entry that failed.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn add_songs(&self, entries: Vec<Value>) -> AppResult<AddSongsResponse> {
        if entries.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one song is required".to_string(),
            ));
        }
        if entries.len() > self.max_batch {
            return Err(AppError::InvalidInput(format!(
                "At most {} songs can be added at once",
                self.max_batch
            )));
        }

        let lookups = entries.iter().map(|entry| async move {
            let song = parse_entry(entry)?;
            self.add_song(song).await
        }).collect::<Vec<_>>();
        let outcomes: Vec<AppResult<SongDocument>> = stream::iter(lookups)
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;

        let mut songs = Vec::new();
        let mut failed = Vec::new();

        for (index, (entry, outcome)) in entries.iter().zip(outcomes).enumerate() {
            match outcome {
                Ok(song) => songs.push(SongResponse::from(song)),
                Err(err) => {
                    let (title, artist) = entry_labels(entry);
                    tracing::warn!(index, error = %err, "Skipping song entry");
                    failed.push(FailedSong {
                        index,
                        title,
                        artist,
                        error: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(added = songs.len(), failed = failed.len(), "Song batch processed");

        Ok(AddSongsResponse {
            message: "Songs added successfully!".to_string(),
            count: songs.len(),
            songs,
            failed,
        })
    }

    async fn add_song(&self, song: NewSong) -> AppResult<SongDocument> {
        let metadata = self.metadata.track_info(&song.artist, &song.title).await?;
        self.store.insert(SongDocument::from_metadata(metadata)).await
    }

    pub async fn list_songs(&self) -> AppResult<Vec<SongResponse>> {
        let songs = self.store.list().await?;
        Ok(songs.into_iter().map(SongResponse::from).collect())
    }

    pub async fn get_song(&self, id: &str) -> AppResult<SongResponse> {
        self.store
            .find_by_id(id)
            .await?
            .map(SongResponse::from)
            .ok_or_else(|| AppError::NotFound("Song not found".to_string()))
    }

    #[instrument(skip(self, update))]
    pub async fn update_song(&self, id: &str, update: UpdateSong) -> AppResult<()> {
        update
            .validate()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        if update.is_empty() {
            return Err(AppError::InvalidInput("No fields to update".to_string()));
        }

        if !self.store.update(id, update).await? {
            return Err(AppError::NotFound("Song not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_song(&self, id: &str) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound("Song not found".to_string()));
        }
        Ok(())
    }

    /// Checks the song store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
