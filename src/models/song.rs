use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A saved song as stored in the songs collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SongDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub listeners: Option<i64>,
    #[serde(default)]
    pub playcount: Option<i64>,
    /// Free-text tags; absent and null both read as "no tags"
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl SongDocument {
    /// Builds a new document from fetched track metadata
    pub fn from_metadata(metadata: TrackMetadata) -> Self {
        Self {
            id: None,
            name: metadata.name,
            artist: metadata.artist,
            album: metadata.album,
            listeners: metadata.listeners,
            playcount: metadata.playcount,
            tags: Some(metadata.tags),
            url: metadata.url,
            created_at: Some(DateTime::now()),
            updated_at: None,
        }
    }

    /// The song's tag set, empty when none were stored
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }
}

/// Song as returned over HTTP, with the object id rendered as hex
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongResponse {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: String,
    pub artist: String,
    pub album: Option<String>,
    pub listeners: Option<i64>,
    pub playcount: Option<i64>,
    pub tags: Vec<String>,
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<SongDocument> for SongResponse {
    fn from(song: SongDocument) -> Self {
        let timestamp = |dt: Option<DateTime>| dt.and_then(|dt| dt.try_to_rfc3339_string().ok());

        Self {
            id: song.id.map(|id| id.to_hex()),
            tags: song.tags.unwrap_or_default(),
            name: song.name,
            artist: song.artist,
            album: song.album,
            listeners: song.listeners,
            playcount: song.playcount,
            url: song.url,
            created_at: timestamp(song.created_at),
            updated_at: timestamp(song.updated_at),
        }
    }
}

/// One entry of a batch song submission
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewSong {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1, max = 300))]
    pub artist: String,
}

/// Partial update applied to a stored song
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSong {
    #[validate(length(min = 1, max = 300))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub artist: Option<String>,
    pub album: Option<String>,
    pub tags: Option<Vec<String>>,
    pub url: Option<String>,
}

impl UpdateSong {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.tags.is_none()
            && self.url.is_none()
    }
}

/// Track metadata fetched from the music catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TrackMetadata {
    pub name: String,
    pub artist: String,
    pub album: Option<String>,
    pub listeners: Option<i64>,
    pub playcount: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub url: Option<String>,
}

/// A batch entry that could not be stored
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailedSong {
    pub index: usize,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub error: String,
}

/// Result of a batch song submission
#[derive(Debug, Clone, Serialize)]
pub struct AddSongsResponse {
    pub message: String,
    pub count: usize,
    pub songs: Vec<SongResponse>,
    pub failed: Vec<FailedSong>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, from_document, Bson};

    #[test]
    fn test_missing_tags_read_as_empty() {
        let song: SongDocument = from_document(doc! {
            "name": "Creep",
            "artist": "Radiohead",
        })
        .unwrap();
        assert!(song.tags().is_empty());
    }

    #[test]
    fn test_null_tags_read_as_empty() {
        let song: SongDocument = from_document(doc! {
            "name": "Creep",
            "artist": "Radiohead",
            "tags": Bson::Null,
        })
        .unwrap();
        assert!(song.tags().is_empty());
    }

    #[test]
    fn test_response_renders_hex_id() {
        let id = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let song = SongDocument {
            id: Some(id),
            name: "Creep".to_string(),
            artist: "Radiohead".to_string(),
            tags: Some(vec!["indie".to_string()]),
            ..Default::default()
        };

        let response = SongResponse::from(song);
        assert_eq!(response.id.as_deref(), Some("507f1f77bcf86cd799439011"));
        assert_eq!(response.tags, vec!["indie".to_string()]);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["_id"], "507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_new_song_validation() {
        let valid = NewSong {
            title: "Creep".to_string(),
            artist: "Radiohead".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = NewSong {
            title: String::new(),
            artist: "Radiohead".to_string(),
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_update_song_is_empty() {
        assert!(UpdateSong::default().is_empty());
        let update = UpdateSong {
            tags: Some(vec![]),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
