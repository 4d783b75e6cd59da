//! Cadence Core
//!
//! Domain types and error handling shared across the Cadence backend.
//!
//! This crate defines:
//! - **Domain Types**: `Playlist`, `PlaylistItem`, `Track`, `User`, and
//!   their string-UUID identifier newtypes
//! - **Error Handling**: the unified `CadenceError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cadence_core::types::{Playlist, User, Role};
//!
//! let user = User::new("Alice", Role::User);
//! let playlist = Playlist::new(user.id.clone(), "My Favorites");
//! assert_eq!(playlist.owner_id, user.id);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{CadenceError, Result};
pub use types::{
    CreatePlaylist, CreateTrack, Playlist, PlaylistId, PlaylistItem, PlaylistItemId, Role, Track,
    TrackId, UpdatePlaylist, User, UserId, PLAYLIST_CAPACITY,
};
