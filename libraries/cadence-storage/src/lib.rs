//! Cadence Storage
//!
//! `SQLite` persistence layer for the Cadence streaming backend.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each feature owns its own queries and logic
//! - **Transactional ordering**: the `playlist_items` slice keeps playlist
//!   positions a dense `1..=N` permutation; every mutation runs as one
//!   immediate write transaction, which is the sole mutual-exclusion
//!   mechanism across concurrent callers
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::{Role, UserId};
//! use cadence_storage::{create_pool, run_migrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://cadence.db").await?;
//! run_migrations(&pool).await?;
//!
//! let caller = UserId::new("user-1");
//! let (playlists, total) =
//!     cadence_storage::playlists::get_all(&pool, &caller, Role::User, 1, 20).await?;
//! # Ok(())
//! # }
//! ```

// Vertical slices
pub mod playlist_items;
pub mod playlists;
pub mod tracks;
pub mod users;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// WAL journal mode plus a generous busy timeout let concurrent write
/// transactions queue instead of failing; foreign keys are enforced.
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!("Creating pool with URL: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
