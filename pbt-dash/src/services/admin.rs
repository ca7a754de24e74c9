//! Admin and cleanup operations
//!
//! Deletions are not transactional. When a session is deleted, removing its
//! CSV file and removing its row are attempted independently and each
//! failure is reported on its own.

use pbt_common::db::{players, sessions, Player};
use pbt_common::storage;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Session {0} not found")]
    SessionNotFound(i64),

    #[error("Player {0} not found")]
    PlayerNotFound(i64),

    #[error("This player has sessions and cannot be deleted. Please delete all their sessions first. ({session_count} remaining)")]
    PlayerHasSessions { player_id: i64, session_count: i64 },

    #[error(transparent)]
    Common(#[from] pbt_common::Error),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteSessionReport {
    pub session_id: i64,
    pub label: String,
    pub row_deleted: bool,
    pub csv_deleted: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PruneReport {
    pub scanned: usize,
    pub removed: usize,
    pub removed_session_ids: Vec<i64>,
    /// Sessions stored without any CSV; never treated as broken
    pub skipped_without_csv: usize,
    pub errors: Vec<String>,
}

/// Delete a session row and its CSV file
pub async fn delete_session(
    db: &SqlitePool,
    session_id: i64,
) -> Result<DeleteSessionReport, AdminError> {
    let session = sessions::get_session(db, session_id)
        .await?
        .ok_or(AdminError::SessionNotFound(session_id))?;

    let mut report = DeleteSessionReport {
        session_id,
        label: session.label(),
        ..Default::default()
    };

    if let Some(csv) = session.csv_path() {
        match storage::remove_if_present(&csv).await {
            Ok(removed) => report.csv_deleted = removed,
            Err(e) => {
                warn!(session_id, path = %csv.display(), "Failed to delete CSV: {}", e);
                report
                    .errors
                    .push(format!("Error deleting CSV {}: {}", csv.display(), e));
            }
        }
    }

    match sessions::delete_session(db, session_id).await {
        Ok(rows) => report.row_deleted = rows > 0,
        Err(e) => {
            warn!(session_id, "Failed to delete session row: {}", e);
            report.errors.push(format!("Error deleting session: {}", e));
        }
    }

    info!(
        session_id,
        row_deleted = report.row_deleted,
        csv_deleted = report.csv_deleted,
        "Deleted session: {}",
        report.label
    );
    Ok(report)
}

/// Delete a player that has no sessions, returning the removed player
pub async fn delete_player(db: &SqlitePool, player_id: i64) -> Result<Player, AdminError> {
    let player = players::get_player(db, player_id)
        .await?
        .ok_or(AdminError::PlayerNotFound(player_id))?;

    let session_count = players::count_sessions(db, player_id).await?;
    if session_count > 0 {
        return Err(AdminError::PlayerHasSessions {
            player_id,
            session_count,
        });
    }

    players::delete_player(db, player_id).await?;
    info!(player_id, name = %player.name, "Player deleted");
    Ok(player)
}

/// Remove every session whose stored CSV path no longer resolves on disk.
///
/// Sessions without a CSV are left alone.
pub async fn prune_broken_sessions(db: &SqlitePool) -> Result<PruneReport, AdminError> {
    let all = sessions::list_all_sessions(db).await?;
    let mut report = PruneReport {
        scanned: all.len(),
        ..Default::default()
    };

    for session in &all {
        let Some(csv) = session.csv_path() else {
            report.skipped_without_csv += 1;
            continue;
        };
        if storage::resolves(&csv).await {
            continue;
        }

        match sessions::delete_session(db, session.id).await {
            Ok(rows) if rows > 0 => {
                report.removed += 1;
                report.removed_session_ids.push(session.id);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(session_id = session.id, "Failed to prune session: {}", e);
                report.errors.push(format!(
                    "Error removing session {}: {}",
                    session.session_name, e
                ));
            }
        }
    }

    if report.removed > 0 {
        info!(
            "Removed {} broken session(s) with missing CSVs",
            report.removed
        );
    } else {
        info!("No broken sessions found");
    }
    Ok(report)
}
