/// Track domain types
use crate::types::TrackId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A track in the catalog
///
/// Audio files, transcoding, and search indexing are handled by external
/// services; this is the metadata record playlists reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: Option<String>,

    /// Album title
    pub album: Option<String>,

    /// Duration in milliseconds
    pub duration_ms: Option<i64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Track {
    /// Create a new track
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: TrackId::generate(),
            title: title.into(),
            artist: None,
            album: None,
            duration_ms: None,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a track
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrack {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_ms: Option<i64>,
}
