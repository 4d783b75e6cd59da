/// Playlist domain types
use crate::types::{PlaylistId, PlaylistItemId, TrackId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of items a playlist may hold
pub const PLAYLIST_CAPACITY: i64 = 100;

/// Playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Owner user ID
    pub owner_id: UserId,

    /// Playlist title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Whether the playlist is visible to everyone
    pub is_public: bool,

    /// Cover image URL (stored by the external image service)
    pub cover_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp (bumped on every item mutation)
    pub updated_at: DateTime<Utc>,

    /// Items ordered by position, when loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PlaylistItem>>,
}

impl Playlist {
    /// Create a new private playlist
    pub fn new(owner_id: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PlaylistId::generate(),
            owner_id,
            title: title.into(),
            description: None,
            is_public: false,
            cover_url: None,
            created_at: now,
            updated_at: now,
            items: None,
        }
    }
}

/// A single (track, position) membership record within one playlist
///
/// Items belong to exactly one playlist. Positions within a playlist are a
/// dense permutation of `1..=N`; only the positioner in the storage layer
/// writes `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// Unique item identifier
    pub id: PlaylistItemId,

    /// Owning playlist
    pub playlist_id: PlaylistId,

    /// Referenced track (not owned)
    pub track_id: TrackId,

    /// 1-based position in the playlist
    pub position: i64,

    /// When the item was added
    pub added_at: DateTime<Utc>,
}

/// Input for creating a playlist
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylist {
    pub title: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub is_public: bool,
}

/// Input for updating a playlist
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlaylist {
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_creation() {
        let owner = UserId::new("user-1");
        let playlist = Playlist::new(owner.clone(), "My Favorites");

        assert_eq!(playlist.owner_id, owner);
        assert_eq!(playlist.title, "My Favorites");
        assert!(!playlist.is_public);
        assert!(playlist.items.is_none());
    }

    #[test]
    fn item_positions_are_one_based() {
        let item = PlaylistItem {
            id: PlaylistItemId::generate(),
            playlist_id: PlaylistId::new("playlist-1"),
            track_id: TrackId::new("track-1"),
            position: 1,
            added_at: Utc::now(),
        };
        assert_eq!(item.position, 1);
    }
}
