mod ids;
mod playlist;
mod track;
mod user;

pub use ids::{PlaylistId, PlaylistItemId, TrackId, UserId};
pub use playlist::{
    CreatePlaylist, Playlist, PlaylistItem, UpdatePlaylist, PLAYLIST_CAPACITY,
};
pub use track::{CreateTrack, Track};
pub use user::{Role, User};
