//! Playlist item positioning
//!
//! Keeps the `position` column of all items within one playlist a dense,
//! 1-based permutation of `1..=N` under arbitrary insert/remove/move
//! sequences, capacity 100.
//!
//! Every mutation runs as a single `BEGIN IMMEDIATE` transaction: the write
//! lock is taken before the item count is read, so two operations on the
//! same playlist serialize at the database instead of interleaving their
//! shift/write steps. Operations on different playlists only contend for
//! the lock briefly; there are no in-process locks and no shared state
//! outside the database. A caller cancelled mid-operation drops the
//! `Transaction`, which rolls back before the connection is reused, so a
//! cancelled mutation leaves neither a partial shift nor a stale lock.

use cadence_core::{error::Result, types::*, CadenceError};
use chrono::Utc;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

/// Insert a track into a playlist at the requested position
///
/// The position is clamped to `[1, N+1]`; when absent the item is appended
/// at `N+1`. Existing items at or after the target shift up by one before
/// the new row is written, so the insert never collides with a shifted row.
///
/// Fails with `PlaylistFull` when the playlist already holds
/// `PLAYLIST_CAPACITY` items, without writing anything.
pub async fn insert_item(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    track_id: TrackId,
    requested_position: Option<i64>,
    user_id: &UserId,
    role: Role,
) -> Result<PlaylistItem> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    let result = insert_item_tx(
        &mut tx,
        playlist_id,
        track_id,
        requested_position,
        user_id,
        role,
    )
    .await;
    finish(tx, result).await
}

async fn insert_item_tx(
    conn: &mut SqliteConnection,
    playlist_id: PlaylistId,
    track_id: TrackId,
    requested_position: Option<i64>,
    user_id: &UserId,
    role: Role,
) -> Result<PlaylistItem> {
    authorize_playlist_write(conn, &playlist_id, user_id, role).await?;

    let track_exists = sqlx::query("SELECT 1 FROM tracks WHERE id = ?")
        .bind(track_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    if track_exists.is_none() {
        return Err(CadenceError::TrackNotFound(track_id));
    }

    let count = item_count(conn, &playlist_id).await?;
    if count >= PLAYLIST_CAPACITY {
        return Err(CadenceError::PlaylistFull(PLAYLIST_CAPACITY));
    }

    let target = requested_position.unwrap_or(count + 1).clamp(1, count + 1);

    // Make room before writing the new row
    if target <= count {
        sqlx::query(
            "UPDATE playlist_items SET position = position + 1
             WHERE playlist_id = ? AND position >= ?",
        )
        .bind(playlist_id.as_str())
        .bind(target)
        .execute(&mut *conn)
        .await?;
    }

    let item = PlaylistItem {
        id: PlaylistItemId::generate(),
        playlist_id,
        track_id,
        position: target,
        added_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO playlist_items (id, playlist_id, track_id, position, added_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(item.id.as_str())
    .bind(item.playlist_id.as_str())
    .bind(item.track_id.as_str())
    .bind(item.position)
    .bind(item.added_at.timestamp())
    .execute(&mut *conn)
    .await?;

    touch_playlist(conn, &item.playlist_id).await?;

    Ok(item)
}

/// Remove an item from a playlist and close the gap it leaves
///
/// The item must belong to the stated playlist; an item id that exists
/// under a different playlist is `PlaylistItemNotFound`, never deletable
/// through the wrong playlist.
pub async fn remove_item(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    item_id: PlaylistItemId,
    user_id: &UserId,
    role: Role,
) -> Result<()> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    let result = remove_item_tx(&mut tx, playlist_id, item_id, user_id, role).await;
    finish(tx, result).await
}

async fn remove_item_tx(
    conn: &mut SqliteConnection,
    playlist_id: PlaylistId,
    item_id: PlaylistItemId,
    user_id: &UserId,
    role: Role,
) -> Result<()> {
    authorize_playlist_write(conn, &playlist_id, user_id, role).await?;

    let row = sqlx::query("SELECT position FROM playlist_items WHERE id = ? AND playlist_id = ?")
        .bind(item_id.as_str())
        .bind(playlist_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Err(CadenceError::PlaylistItemNotFound(item_id));
    };
    let removed_position: i64 = row.get("position");

    sqlx::query("DELETE FROM playlist_items WHERE id = ?")
        .bind(item_id.as_str())
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "UPDATE playlist_items SET position = position - 1
         WHERE playlist_id = ? AND position > ?",
    )
    .bind(playlist_id.as_str())
    .bind(removed_position)
    .execute(&mut *conn)
    .await?;

    touch_playlist(conn, &playlist_id).await?;

    Ok(())
}

/// Move an item to a new position within its playlist
///
/// The target is clamped to `[1, N]`. Moving an item onto its current
/// position succeeds without writing; otherwise only the items strictly
/// between the old and new position (inclusive of the target) shift by one
/// to absorb the move.
pub async fn move_item(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    item_id: PlaylistItemId,
    new_position: i64,
    user_id: &UserId,
    role: Role,
) -> Result<()> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    let result = move_item_tx(&mut tx, playlist_id, item_id, new_position, user_id, role).await;
    finish(tx, result).await
}

async fn move_item_tx(
    conn: &mut SqliteConnection,
    playlist_id: PlaylistId,
    item_id: PlaylistItemId,
    new_position: i64,
    user_id: &UserId,
    role: Role,
) -> Result<()> {
    authorize_playlist_write(conn, &playlist_id, user_id, role).await?;

    let row = sqlx::query("SELECT position FROM playlist_items WHERE id = ? AND playlist_id = ?")
        .bind(item_id.as_str())
        .bind(playlist_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Err(CadenceError::PlaylistItemNotFound(item_id));
    };
    let current: i64 = row.get("position");

    // The item occupies one of the N slots already, so unlike insert the
    // target clamps to [1, N], not [1, N+1].
    let count = item_count(conn, &playlist_id).await?;
    let target = new_position.clamp(1, count);

    if target == current {
        return Ok(());
    }

    if target < current {
        // Moving earlier: the span [target, current) shifts later
        sqlx::query(
            "UPDATE playlist_items SET position = position + 1
             WHERE playlist_id = ? AND position >= ? AND position < ?",
        )
        .bind(playlist_id.as_str())
        .bind(target)
        .bind(current)
        .execute(&mut *conn)
        .await?;
    } else {
        // Moving later: the span (current, target] shifts earlier
        sqlx::query(
            "UPDATE playlist_items SET position = position - 1
             WHERE playlist_id = ? AND position > ? AND position <= ?",
        )
        .bind(playlist_id.as_str())
        .bind(current)
        .bind(target)
        .execute(&mut *conn)
        .await?;
    }

    sqlx::query("UPDATE playlist_items SET position = ? WHERE id = ?")
        .bind(target)
        .bind(item_id.as_str())
        .execute(&mut *conn)
        .await?;

    touch_playlist(conn, &playlist_id).await?;

    Ok(())
}

/// Get a playlist's items ordered by position
pub async fn get_items(pool: &SqlitePool, playlist_id: &PlaylistId) -> Result<Vec<PlaylistItem>> {
    let rows = sqlx::query(
        "SELECT id, playlist_id, track_id, position, added_at
         FROM playlist_items WHERE playlist_id = ? ORDER BY position",
    )
    .bind(playlist_id.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(PlaylistItem {
                id: PlaylistItemId::new(row.get::<String, _>("id")),
                playlist_id: PlaylistId::new(row.get::<String, _>("playlist_id")),
                track_id: TrackId::new(row.get::<String, _>("track_id")),
                position: row.get("position"),
                added_at: chrono::DateTime::from_timestamp(row.get::<i64, _>("added_at"), 0)
                    .ok_or_else(|| CadenceError::storage("Invalid timestamp"))?,
            })
        })
        .collect()
}

// Helper functions

/// Verify the playlist exists and the caller may mutate it (owner or admin)
async fn authorize_playlist_write(
    conn: &mut SqliteConnection,
    playlist_id: &PlaylistId,
    user_id: &UserId,
    role: Role,
) -> Result<()> {
    let row = sqlx::query("SELECT owner_id FROM playlists WHERE id = ?")
        .bind(playlist_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Err(CadenceError::PlaylistNotFound(playlist_id.clone()));
    };

    let owner_id: String = row.get("owner_id");
    if owner_id != user_id.as_str() && !role.is_admin() {
        return Err(CadenceError::PermissionDenied);
    }

    Ok(())
}

async fn item_count(conn: &mut SqliteConnection, playlist_id: &PlaylistId) -> Result<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM playlist_items WHERE playlist_id = ?")
            .bind(playlist_id.as_str())
            .fetch_one(conn)
            .await?;
    Ok(count)
}

async fn touch_playlist(conn: &mut SqliteConnection, playlist_id: &PlaylistId) -> Result<()> {
    sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
        .bind(Utc::now().timestamp())
        .bind(playlist_id.as_str())
        .execute(conn)
        .await?;
    Ok(())
}

/// Commit on success, roll back on error; either way nothing partial lands
async fn finish<T>(tx: Transaction<'static, Sqlite>, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("Rollback failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}
