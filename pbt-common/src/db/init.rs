//! Database initialization
//!
//! Opens (creating if needed) the SQLite database and creates the `players`
//! and `sessions` tables. Safe to run on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const BUSY_TIMEOUT_MS: u64 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Foreign keys are set per connection, so they go on the connect options
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_players_table(&pool).await?;
    create_sessions_table(&pool).await?;

    Ok(pool)
}

/// Create the players table
///
/// `name_key`/`team_key` hold the trimmed, lowercased natural key so that
/// case variants of the same player collapse onto one row.
pub async fn create_players_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            team TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            name_key TEXT NOT NULL,
            team_key TEXT NOT NULL,
            UNIQUE (name_key, team_key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the sessions table
///
/// `kinovea_csv` is nullable; `player_id` has no cascade so a player with
/// sessions cannot be removed.
pub async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            player_id INTEGER NOT NULL REFERENCES players(id),
            date TEXT NOT NULL,
            session_name TEXT NOT NULL,
            video_source TEXT NOT NULL,
            kinovea_csv TEXT,
            notes TEXT NOT NULL DEFAULT '',
            storage_key TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_player_id ON sessions(player_id)")
        .execute(pool)
        .await?;

    Ok(())
}
