//! Player queries

use super::models::{normalize_key, Player, PlayerSummary};
use crate::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::info;

fn player_from_row(row: &SqliteRow) -> Result<Player> {
    Ok(Player {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        team: row.try_get("team")?,
        notes: row.try_get("notes")?,
    })
}

/// Look up a player by case-insensitive (name, team)
pub async fn find_by_natural_key<'e, E>(executor: E, name: &str, team: &str) -> Result<Option<Player>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT id, name, team, notes
        FROM players
        WHERE name_key = ? AND team_key = ?
        "#,
    )
    .bind(normalize_key(name))
    .bind(normalize_key(team))
    .fetch_optional(executor)
    .await?;

    row.as_ref().map(player_from_row).transpose()
}

/// Insert a new player, returning its id
pub async fn insert_player<'e, E>(executor: E, name: &str, team: &str, notes: &str) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO players (name, team, notes, name_key, team_key)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(name.trim())
    .bind(team.trim())
    .bind(notes)
    .bind(normalize_key(name))
    .bind(normalize_key(team))
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Reuse the player matching (name, team), or create one with empty notes.
///
/// Returns the player id and whether a new row was inserted.
pub async fn resolve_player(
    conn: &mut SqliteConnection,
    name: &str,
    team: &str,
) -> Result<(i64, bool)> {
    if let Some(existing) = find_by_natural_key(&mut *conn, name, team).await? {
        return Ok((existing.id, false));
    }

    let id = insert_player(&mut *conn, name, team, "").await?;
    info!(player_id = id, name = name.trim(), team = team.trim(), "Created player");
    Ok((id, true))
}

pub async fn get_player(pool: &SqlitePool, id: i64) -> Result<Option<Player>> {
    let row = sqlx::query("SELECT id, name, team, notes FROM players WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(player_from_row).transpose()
}

pub async fn list_players(pool: &SqlitePool) -> Result<Vec<Player>> {
    let rows = sqlx::query("SELECT id, name, team, notes FROM players ORDER BY id")
        .fetch_all(pool)
        .await?;

    rows.iter().map(player_from_row).collect()
}

/// All players with their session counts, ordered by id
pub async fn list_player_summaries(pool: &SqlitePool) -> Result<Vec<PlayerSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT p.id, p.name, p.team, p.notes, COUNT(s.id) AS session_count
        FROM players p
        LEFT JOIN sessions s ON s.player_id = p.id
        GROUP BY p.id
        ORDER BY p.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(PlayerSummary {
                player: player_from_row(row)?,
                session_count: row.try_get("session_count")?,
            })
        })
        .collect()
}

pub async fn count_sessions(pool: &SqlitePool, player_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE player_id = ?")
        .bind(player_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Delete a player row. Returns the number of rows removed.
pub async fn delete_player(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM players WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
