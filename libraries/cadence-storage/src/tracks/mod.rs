//! Tracks vertical slice
//!
//! Catalog lookup consumed by the playlist endpoints. Upload, transcoding
//! and search indexing happen in external services.

use cadence_core::{error::Result, types::*, CadenceError};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

/// Create a track metadata record
pub async fn create(pool: &SqlitePool, track: CreateTrack) -> Result<Track> {
    let now = Utc::now();
    let id = TrackId::generate();

    sqlx::query(
        "INSERT INTO tracks (id, title, artist, album, duration_ms, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id.as_str())
    .bind(&track.title)
    .bind(&track.artist)
    .bind(&track.album)
    .bind(track.duration_ms)
    .bind(now.timestamp())
    .execute(pool)
    .await?;

    Ok(Track {
        id,
        title: track.title,
        artist: track.artist,
        album: track.album,
        duration_ms: track.duration_ms,
        created_at: now,
    })
}

/// Get track by ID
pub async fn get_by_id(pool: &SqlitePool, id: &TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(
        "SELECT id, title, artist, album, duration_ms, created_at FROM tracks WHERE id = ?",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(|row| track_from_row(&row)).transpose()
}

/// Paged listing of the catalog, newest first
pub async fn get_all(pool: &SqlitePool, page: i64, limit: i64) -> Result<(Vec<Track>, i64)> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tracks")
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query(
        "SELECT id, title, artist, album, duration_ms, created_at
         FROM tracks ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind((page - 1) * limit)
    .fetch_all(pool)
    .await?;

    let tracks = rows.iter().map(track_from_row).collect::<Result<Vec<_>>>()?;

    Ok((tracks, total))
}

fn track_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Track> {
    Ok(Track {
        id: TrackId::new(row.get::<String, _>("id")),
        title: row.get("title"),
        artist: row.get("artist"),
        album: row.get("album"),
        duration_ms: row.get("duration_ms"),
        created_at: chrono::DateTime::from_timestamp(row.get::<i64, _>("created_at"), 0)
            .ok_or_else(|| CadenceError::storage("Invalid timestamp"))?,
    })
}
