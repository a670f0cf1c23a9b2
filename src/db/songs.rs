use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    options::FindOptions,
    Collection, Database,
};
use tracing::instrument;

use crate::{
    db::mongo::bounded,
    error::{AppError, AppResult},
    models::{SongDocument, UpdateSong},
};

/// Data access for saved songs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Fetch a song by its hex object id
    async fn find_by_id(&self, id: &str) -> AppResult<Option<SongDocument>>;

    /// All saved songs, newest first
    async fn list(&self) -> AppResult<Vec<SongDocument>>;

    /// Insert a song and return it with its assigned id
    async fn insert(&self, song: SongDocument) -> AppResult<SongDocument>;

    /// Apply a partial update; `false` if no song has this id
    async fn update(&self, id: &str, update: UpdateSong) -> AppResult<bool>;

    /// Delete a song; `false` if no song has this id
    async fn delete(&self, id: &str) -> AppResult<bool>;

    /// Check the backing store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Parses a hex object id, rejecting anything malformed
pub fn parse_song_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidInput(format!("Invalid song id: {}", id)))
}

/// MongoDB-backed song store
pub struct MongoSongStore {
    db: Database,
    collection: Collection<SongDocument>,
    timeout: Duration,
}

impl MongoSongStore {
    /// Every operation fails with `UpstreamUnavailable` after `timeout`
    pub fn new(db: Database, collection_name: &str, timeout: Duration) -> Self {
        let collection = db.collection::<SongDocument>(collection_name);
        Self {
            db,
            collection,
            timeout,
        }
    }

    /// Builds the `$set` document for a partial update
    fn build_update(update: UpdateSong) -> Document {
        let mut set = doc! { "updated_at": DateTime::now() };

        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(artist) = update.artist {
            set.insert("artist", artist);
        }
        if let Some(album) = update.album {
            set.insert("album", album);
        }
        if let Some(tags) = update.tags {
            set.insert("tags", tags);
        }
        if let Some(url) = update.url {
            set.insert("url", url);
        }

        doc! { "$set": set }
    }
}

#[async_trait]
impl SongStore for MongoSongStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> AppResult<Option<SongDocument>> {
        let oid = parse_song_id(id)?;
        let song = bounded(self.timeout, self.collection.find_one(doc! { "_id": oid })).await?;
        Ok(song)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> AppResult<Vec<SongDocument>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let songs = bounded(self.timeout, async {
            let cursor = self.collection.find(doc! {}).with_options(options).await?;
            cursor.try_collect::<Vec<SongDocument>>().await
        })
        .await?;

        Ok(songs)
    }

    #[instrument(skip(self, song), fields(song_name = %song.name))]
    async fn insert(&self, mut song: SongDocument) -> AppResult<SongDocument> {
        let result = bounded(self.timeout, self.collection.insert_one(&song)).await?;
        song.id = result.inserted_id.as_object_id();

        tracing::info!(song_id = ?song.id, "Song stored");
        Ok(song)
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: &str, update: UpdateSong) -> AppResult<bool> {
        let oid = parse_song_id(id)?;
        let result = bounded(
            self.timeout,
            self.collection
                .update_one(doc! { "_id": oid }, Self::build_update(update)),
        )
        .await?;

        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> AppResult<bool> {
        let oid = parse_song_id(id)?;
        let result = bounded(self.timeout, self.collection.delete_one(doc! { "_id": oid })).await?;

        if result.deleted_count > 0 {
            tracing::info!(song_id = %id, "Song deleted");
        }

        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        bounded(self.timeout, self.db.run_command(doc! { "ping": 1 })).await?;
        Ok(())
    }
}
