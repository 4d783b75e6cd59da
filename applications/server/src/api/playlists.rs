/// Playlist API routes
use crate::{
    api::{validate_uuid, Pagination, PaginationParams},
    error::Result,
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use cadence_core::{CreatePlaylist, Playlist, PlaylistId, UpdatePlaylist};
use cadence_storage::playlists;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistListResponse {
    pub playlists: Vec<Playlist>,
    pub pagination: Pagination,
}

/// GET /api/playlists - List playlists visible to the caller
pub async fn list_playlists(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PlaylistListResponse>> {
    let (page, limit) = params.resolve();

    let (playlists, total) =
        playlists::get_all(&state.pool, auth.user_id(), auth.role(), page, limit).await?;

    Ok(Json(PlaylistListResponse {
        playlists,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// GET /api/playlists/search?q= - Search playlists by title
pub async fn search_playlists(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<PlaylistListResponse>> {
    let (page, limit) = PaginationParams {
        page: params.page,
        limit: params.limit,
    }
    .resolve();

    let (playlists, total) = playlists::search(
        &state.pool,
        &params.q,
        auth.user_id(),
        auth.role(),
        page,
        limit,
    )
    .await?;

    Ok(Json(PlaylistListResponse {
        playlists,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// POST /api/playlists - Create a playlist owned by the caller
pub async fn create_playlist(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<CreatePlaylistRequest>,
) -> Result<(StatusCode, Json<Playlist>)> {
    let playlist = playlists::create(
        &state.pool,
        CreatePlaylist {
            title: request.title,
            description: request.description,
            owner_id: auth.user_id().clone(),
            is_public: request.is_public,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /api/playlists/:id - Get a playlist with its items in order
pub async fn get_playlist(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Playlist>> {
    validate_uuid(&id, "playlist")?;

    let playlist = playlists::get_with_items(
        &state.pool,
        &PlaylistId::new(id),
        auth.user_id(),
        auth.role(),
    )
    .await?;

    Ok(Json(playlist))
}

/// PUT /api/playlists/:id - Update playlist metadata (owner or admin)
pub async fn update_playlist(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<UpdatePlaylistRequest>,
) -> Result<Json<Playlist>> {
    validate_uuid(&id, "playlist")?;

    let playlist = playlists::update(
        &state.pool,
        &PlaylistId::new(id),
        UpdatePlaylist {
            title: request.title,
            description: request.description,
            is_public: request.is_public,
        },
        auth.user_id(),
        auth.role(),
    )
    .await?;

    Ok(Json(playlist))
}

/// DELETE /api/playlists/:id - Delete a playlist (owner or admin)
pub async fn delete_playlist(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    validate_uuid(&id, "playlist")?;

    playlists::delete(&state.pool, &PlaylistId::new(id), auth.user_id(), auth.role()).await?;

    Ok(Json(json!({ "success": true })))
}
