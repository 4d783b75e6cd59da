/// Track catalog API routes
use crate::{
    api::{validate_uuid, Pagination, PaginationParams},
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use cadence_core::{CreateTrack, Track, TrackId};
use cadence_storage::tracks;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateTrackRequest {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TrackListResponse {
    pub tracks: Vec<Track>,
    pub pagination: Pagination,
}

/// GET /api/tracks - Paged catalog listing
pub async fn list_tracks(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<TrackListResponse>> {
    let (page, limit) = params.resolve();

    let (tracks, total) = tracks::get_all(&state.pool, page, limit).await?;

    Ok(Json(TrackListResponse {
        tracks,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// GET /api/tracks/:id - Get track metadata
pub async fn get_track(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Track>> {
    validate_uuid(&id, "track")?;

    let track_id = TrackId::new(id);
    let track = tracks::get_by_id(&state.pool, &track_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Track not found: {track_id}")))?;

    Ok(Json(track))
}

/// POST /api/tracks - Register track metadata (admin only)
///
/// Audio ingestion happens out of band; this only records catalog rows.
pub async fn create_track(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<CreateTrackRequest>,
) -> Result<(StatusCode, Json<Track>)> {
    if !auth.role().is_admin() {
        return Err(ServerError::Unauthorized(
            "Only admins can register tracks".to_string(),
        ));
    }

    let track = tracks::create(
        &state.pool,
        CreateTrack {
            title: request.title,
            artist: request.artist,
            album: request.album,
            duration_ms: request.duration_ms,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(track)))
}
