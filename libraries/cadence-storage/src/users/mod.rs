//! Users vertical slice
//!
//! Ownership records only; authentication is the external auth provider's
//! concern. Rows are created on first sight of a provider subject id.

use cadence_core::{error::Result, types::*, CadenceError};
use sqlx::{Row, SqlitePool};

/// Create a user record
pub async fn create(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query("INSERT INTO users (id, name, role, created_at) VALUES (?, ?, ?, ?)")
        .bind(user.id.as_str())
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.created_at.timestamp())
        .execute(pool)
        .await?;

    Ok(())
}

/// Get user by ID
pub async fn get_by_id(pool: &SqlitePool, id: &UserId) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, name, role, created_at FROM users WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.map(|row| user_from_row(&row)).transpose()
}

/// List all users
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query("SELECT id, name, role, created_at FROM users ORDER BY created_at")
        .fetch_all(pool)
        .await?;

    rows.iter().map(user_from_row).collect()
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str = row.get::<String, _>("role");
    let role = Role::parse(&role_str)
        .ok_or_else(|| CadenceError::storage(format!("Invalid role: {role_str}")))?;

    Ok(User::with_id(
        UserId::new(row.get::<String, _>("id")),
        row.get::<String, _>("name"),
        role,
        chrono::DateTime::from_timestamp(row.get::<i64, _>("created_at"), 0)
            .ok_or_else(|| CadenceError::storage("Invalid timestamp"))?,
    ))
}
