//! Playlists vertical slice
//!
//! CRUD and listing for playlists. Visibility: public playlists are
//! readable by everyone, private ones only by their owner or an admin;
//! mutation always requires owner or admin.

use cadence_core::{error::Result, types::*, CadenceError};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

/// Create a new playlist
pub async fn create(pool: &SqlitePool, playlist: CreatePlaylist) -> Result<Playlist> {
    let now = Utc::now();
    let id = PlaylistId::generate();

    sqlx::query(
        "INSERT INTO playlists (id, owner_id, title, description, is_public, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.as_str())
    .bind(playlist.owner_id.as_str())
    .bind(&playlist.title)
    .bind(&playlist.description)
    .bind(playlist.is_public)
    .bind(now.timestamp())
    .bind(now.timestamp())
    .execute(pool)
    .await?;

    Ok(Playlist {
        id,
        owner_id: playlist.owner_id,
        title: playlist.title,
        description: playlist.description,
        is_public: playlist.is_public,
        cover_url: None,
        created_at: now,
        updated_at: now,
        items: None,
    })
}

/// Get playlist by ID, without visibility checks (internal use)
pub async fn get_by_id(pool: &SqlitePool, id: &PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(
        "SELECT id, owner_id, title, description, is_public, cover_url, created_at, updated_at
         FROM playlists WHERE id = ?",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(|row| playlist_from_row(&row)).transpose()
}

/// Get a playlist with its items ordered by position
///
/// Private playlists are only visible to their owner or an admin.
pub async fn get_with_items(
    pool: &SqlitePool,
    id: &PlaylistId,
    user_id: &UserId,
    role: Role,
) -> Result<Playlist> {
    let Some(mut playlist) = get_by_id(pool, id).await? else {
        return Err(CadenceError::PlaylistNotFound(id.clone()));
    };

    if !playlist.is_public && playlist.owner_id != *user_id && !role.is_admin() {
        return Err(CadenceError::PermissionDenied);
    }

    playlist.items = Some(crate::playlist_items::get_items(pool, id).await?);

    Ok(playlist)
}

/// Update title, description and visibility (owner or admin only)
pub async fn update(
    pool: &SqlitePool,
    id: &PlaylistId,
    changes: UpdatePlaylist,
    user_id: &UserId,
    role: Role,
) -> Result<Playlist> {
    check_owner(pool, id, user_id, role).await?;

    sqlx::query(
        "UPDATE playlists SET title = ?, description = ?, is_public = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(changes.is_public)
    .bind(Utc::now().timestamp())
    .bind(id.as_str())
    .execute(pool)
    .await?;

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| CadenceError::PlaylistNotFound(id.clone()))
}

/// Delete a playlist and, via cascade, its items (owner or admin only)
pub async fn delete(pool: &SqlitePool, id: &PlaylistId, user_id: &UserId, role: Role) -> Result<()> {
    check_owner(pool, id, user_id, role).await?;

    sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await?;

    Ok(())
}

/// Paged listing of playlists visible to the caller (public or own)
///
/// Admins see everything. Returns the page plus the total row count.
pub async fn get_all(
    pool: &SqlitePool,
    user_id: &UserId,
    role: Role,
    page: i64,
    limit: i64,
) -> Result<(Vec<Playlist>, i64)> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM playlists WHERE (is_public = 1 OR owner_id = ? OR ?)",
    )
    .bind(user_id.as_str())
    .bind(role.is_admin())
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(
        "SELECT id, owner_id, title, description, is_public, cover_url, created_at, updated_at
         FROM playlists WHERE (is_public = 1 OR owner_id = ? OR ?)
         ORDER BY created_at DESC
         LIMIT ? OFFSET ?",
    )
    .bind(user_id.as_str())
    .bind(role.is_admin())
    .bind(limit)
    .bind((page - 1) * limit)
    .fetch_all(pool)
    .await?;

    let playlists = rows
        .iter()
        .map(playlist_from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok((playlists, total))
}

/// Paged case-insensitive title search, scoped like `get_all`
pub async fn search(
    pool: &SqlitePool,
    query: &str,
    user_id: &UserId,
    role: Role,
    page: i64,
    limit: i64,
) -> Result<(Vec<Playlist>, i64)> {
    let pattern = format!("%{}%", query);

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM playlists
         WHERE title LIKE ? AND (is_public = 1 OR owner_id = ? OR ?)",
    )
    .bind(&pattern)
    .bind(user_id.as_str())
    .bind(role.is_admin())
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(
        "SELECT id, owner_id, title, description, is_public, cover_url, created_at, updated_at
         FROM playlists WHERE title LIKE ? AND (is_public = 1 OR owner_id = ? OR ?)
         ORDER BY created_at DESC
         LIMIT ? OFFSET ?",
    )
    .bind(&pattern)
    .bind(user_id.as_str())
    .bind(role.is_admin())
    .bind(limit)
    .bind((page - 1) * limit)
    .fetch_all(pool)
    .await?;

    let playlists = rows
        .iter()
        .map(playlist_from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok((playlists, total))
}

// Helper functions

async fn check_owner(
    pool: &SqlitePool,
    id: &PlaylistId,
    user_id: &UserId,
    role: Role,
) -> Result<()> {
    let Some(playlist) = get_by_id(pool, id).await? else {
        return Err(CadenceError::PlaylistNotFound(id.clone()));
    };

    if playlist.owner_id != *user_id && !role.is_admin() {
        return Err(CadenceError::PermissionDenied);
    }

    Ok(())
}

fn playlist_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Playlist> {
    Ok(Playlist {
        id: PlaylistId::new(row.get::<String, _>("id")),
        owner_id: UserId::new(row.get::<String, _>("owner_id")),
        title: row.get("title"),
        description: row.get("description"),
        is_public: row.get::<i64, _>("is_public") != 0,
        cover_url: row.get("cover_url"),
        created_at: chrono::DateTime::from_timestamp(row.get::<i64, _>("created_at"), 0)
            .ok_or_else(|| CadenceError::storage("Invalid timestamp"))?,
        updated_at: chrono::DateTime::from_timestamp(row.get::<i64, _>("updated_at"), 0)
            .ok_or_else(|| CadenceError::storage("Invalid timestamp"))?,
        items: None,
    })
}
