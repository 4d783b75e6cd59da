/// Playlist item API routes
///
/// The position bookkeeping itself lives in the storage layer; these
/// handlers only translate HTTP shapes to and from it.
use crate::{
    api::validate_uuid,
    error::Result,
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cadence_core::{PlaylistId, PlaylistItem, PlaylistItemId, TrackId};
use cadence_storage::playlist_items;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub track_id: String,
    /// Desired 1-based position; omitted means append
    pub position: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MoveItemRequest {
    pub new_position: i64,
}

/// POST /api/playlists/:id/items - Add a track to a playlist
pub async fn add_item(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(playlist_id): Path<String>,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<PlaylistItem>)> {
    validate_uuid(&playlist_id, "playlist")?;
    validate_uuid(&request.track_id, "track")?;

    let item = playlist_items::insert_item(
        &state.pool,
        PlaylistId::new(playlist_id),
        TrackId::new(request.track_id),
        request.position,
        auth.user_id(),
        auth.role(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// DELETE /api/playlists/:id/items/:item_id - Remove an item
pub async fn remove_item(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((playlist_id, item_id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    validate_uuid(&playlist_id, "playlist")?;
    validate_uuid(&item_id, "item")?;

    playlist_items::remove_item(
        &state.pool,
        PlaylistId::new(playlist_id),
        PlaylistItemId::new(item_id),
        auth.user_id(),
        auth.role(),
    )
    .await?;

    Ok(Json(json!({ "success": true })))
}

/// PUT /api/playlists/:id/items/:item_id/position - Move an item
pub async fn move_item(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((playlist_id, item_id)): Path<(String, String)>,
    Json(request): Json<MoveItemRequest>,
) -> Result<Json<Value>> {
    validate_uuid(&playlist_id, "playlist")?;
    validate_uuid(&item_id, "item")?;

    playlist_items::move_item(
        &state.pool,
        PlaylistId::new(playlist_id),
        PlaylistItemId::new(item_id),
        request.new_position,
        auth.user_id(),
        auth.role(),
    )
    .await?;

    Ok(Json(json!({ "success": true })))
}
