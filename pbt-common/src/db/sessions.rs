//! Session queries

use super::models::{NewSession, Session};
use crate::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};

const SESSION_COLUMNS: &str =
    "id, player_id, date, session_name, video_source, kinovea_csv, notes, storage_key";

fn session_from_row(row: &SqliteRow) -> Result<Session> {
    Ok(Session {
        id: row.try_get("id")?,
        player_id: row.try_get("player_id")?,
        date: row.try_get("date")?,
        session_name: row.try_get("session_name")?,
        video_source: row.try_get("video_source")?,
        kinovea_csv: row.try_get("kinovea_csv")?,
        notes: row.try_get("notes")?,
        storage_key: row.try_get("storage_key")?,
    })
}

/// Insert a session row, returning its id
pub async fn insert_session<'e, E>(executor: E, session: &NewSession) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let csv = session
        .kinovea_csv
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());

    let result = sqlx::query(
        r#"
        INSERT INTO sessions
            (player_id, date, session_name, video_source, kinovea_csv, notes, storage_key)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(session.player_id)
    .bind(&session.date)
    .bind(&session.session_name)
    .bind(session.video_source.as_stored())
    .bind(csv)
    .bind(&session.notes)
    .bind(session.storage_key.to_string())
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_session(pool: &SqlitePool, id: i64) -> Result<Option<Session>> {
    let row = sqlx::query(&format!("SELECT {} FROM sessions WHERE id = ?", SESSION_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(session_from_row).transpose()
}

/// A player's sessions in insertion order
pub async fn list_sessions_for_player(pool: &SqlitePool, player_id: i64) -> Result<Vec<Session>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM sessions WHERE player_id = ? ORDER BY id",
        SESSION_COLUMNS
    ))
    .bind(player_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(session_from_row).collect()
}

/// First of a player's sessions whose label is `label`
///
/// Labels are not unique; the earliest inserted match wins.
pub async fn find_session_by_label(
    pool: &SqlitePool,
    player_id: i64,
    label: &str,
) -> Result<Option<Session>> {
    let row = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM sessions
        WHERE player_id = ? AND (date || ' - ' || session_name) = ?
        ORDER BY id
        LIMIT 1
        "#,
        SESSION_COLUMNS
    ))
    .bind(player_id)
    .bind(label)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(session_from_row).transpose()
}

pub async fn list_all_sessions(pool: &SqlitePool) -> Result<Vec<Session>> {
    let rows = sqlx::query(&format!("SELECT {} FROM sessions ORDER BY id", SESSION_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(session_from_row).collect()
}

/// Delete a session row. Returns the number of rows removed.
pub async fn delete_session(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
