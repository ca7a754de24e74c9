//! Session ingestion
//!
//! Validates a submitted session form, stores the uploaded files under a
//! fresh storage key, resolves or creates the player by case-insensitive
//! (name, team) and inserts exactly one session row.

use chrono::NaiveDate;
use pbt_common::db::{players, session_label, sessions, NewSession};
use pbt_common::storage::{self, FileStore, StorageKey};
use pbt_common::video;
use pbt_common::VideoSource;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How the video for a session was supplied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoInput {
    Link(String),
    File(Vec<u8>),
    Missing,
}

/// A submitted upload form
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub player_name: String,
    pub team: String,
    pub session_name: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    pub notes: String,
    pub video: VideoInput,
    pub csv: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub session_id: i64,
    pub player_id: i64,
    pub player_created: bool,
    pub label: String,
    pub storage_key: StorageKey,
    pub video_source: VideoSource,
    pub kinovea_csv: Option<String>,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Please upload a video (YouTube link or file).")]
    MissingVideo,

    #[error("{0} is required.")]
    MissingField(&'static str),

    #[error("Video link must start with http:// or https://: {0}")]
    InvalidLink(String),

    #[error("Invalid session date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error(transparent)]
    Common(#[from] pbt_common::Error),
}

impl From<sqlx::Error> for IngestError {
    fn from(e: sqlx::Error) -> Self {
        IngestError::Common(e.into())
    }
}

/// Validated form values, ready to persist
struct ValidSubmission {
    player_name: String,
    team: String,
    session_name: String,
    date: NaiveDate,
    notes: String,
    video: ValidVideo,
    csv: Option<Vec<u8>>,
}

enum ValidVideo {
    Link(String),
    File(Vec<u8>),
}

fn validate(request: IngestRequest) -> Result<ValidSubmission, IngestError> {
    let video = match request.video {
        VideoInput::Link(link) => {
            let link = link.trim().to_string();
            if link.is_empty() {
                return Err(IngestError::MissingVideo);
            }
            if !video::is_remote(&link) {
                return Err(IngestError::InvalidLink(link));
            }
            ValidVideo::Link(link)
        }
        VideoInput::File(bytes) if !bytes.is_empty() => ValidVideo::File(bytes),
        VideoInput::File(_) | VideoInput::Missing => return Err(IngestError::MissingVideo),
    };

    let player_name = request.player_name.trim().to_string();
    if player_name.is_empty() {
        return Err(IngestError::MissingField("Player name"));
    }
    let session_name = request.session_name.trim().to_string();
    if session_name.is_empty() {
        return Err(IngestError::MissingField("Session name"));
    }

    let date = NaiveDate::parse_from_str(request.date.trim(), DATE_FORMAT)
        .map_err(|_| IngestError::InvalidDate(request.date.clone()))?;

    Ok(ValidSubmission {
        player_name,
        team: request.team.trim().to_string(),
        session_name,
        date,
        notes: request.notes,
        video,
        csv: request.csv.filter(|b| !b.is_empty()),
    })
}

/// Persist one submitted session.
///
/// Files are written first; player resolution and the session insert share
/// one transaction. If the database step fails the written files are removed.
pub async fn ingest_session(
    db: &SqlitePool,
    store: &FileStore,
    request: IngestRequest,
) -> Result<IngestOutcome, IngestError> {
    let submission = validate(request)?;
    let key = StorageKey::generate();

    let mut written: Vec<PathBuf> = Vec::new();
    let stored = store_files(store, key, &submission, &mut written).await;
    let (video_source, csv_path) = match stored {
        Ok(paths) => paths,
        Err(e) => {
            discard(&written).await;
            return Err(e);
        }
    };

    let date = submission.date.format(DATE_FORMAT).to_string();
    let new_session = NewSession {
        player_id: 0,
        date: date.clone(),
        session_name: submission.session_name.clone(),
        video_source: video_source.clone(),
        kinovea_csv: csv_path.clone(),
        notes: submission.notes.clone(),
        storage_key: key,
    };

    match insert_rows(db, &submission, new_session).await {
        Ok((session_id, player_id, player_created)) => {
            info!(
                session_id,
                player_id,
                player_created,
                storage_key = %key,
                has_csv = csv_path.is_some(),
                "Session uploaded"
            );
            Ok(IngestOutcome {
                session_id,
                player_id,
                player_created,
                label: session_label(&date, &submission.session_name),
                storage_key: key,
                video_source,
                kinovea_csv: csv_path.map(|p| p.to_string_lossy().into_owned()),
            })
        }
        Err(e) => {
            discard(&written).await;
            Err(e)
        }
    }
}

async fn store_files(
    store: &FileStore,
    key: StorageKey,
    submission: &ValidSubmission,
    written: &mut Vec<PathBuf>,
) -> Result<(VideoSource, Option<PathBuf>), IngestError> {
    let csv_path = match &submission.csv {
        Some(bytes) => {
            let path = store.write_csv(key, bytes).await?;
            written.push(path.clone());
            Some(path)
        }
        None => None,
    };

    let video_source = match &submission.video {
        ValidVideo::Link(link) => VideoSource::Remote(link.clone()),
        ValidVideo::File(bytes) => {
            let path = store.write_video(key, bytes).await?;
            written.push(path.clone());
            VideoSource::Local(path)
        }
    };

    Ok((video_source, csv_path))
}

async fn insert_rows(
    db: &SqlitePool,
    submission: &ValidSubmission,
    mut new_session: NewSession,
) -> Result<(i64, i64, bool), IngestError> {
    let mut tx = db.begin().await?;
    let (player_id, player_created) =
        players::resolve_player(&mut tx, &submission.player_name, &submission.team).await?;
    new_session.player_id = player_id;
    let session_id = sessions::insert_session(&mut *tx, &new_session).await?;
    tx.commit().await?;
    Ok((session_id, player_id, player_created))
}

async fn discard(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = storage::remove_if_present(path).await {
            warn!("Failed to remove orphaned upload {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(video: VideoInput) -> IngestRequest {
        IngestRequest {
            player_name: "Sam Reyes".to_string(),
            team: "Tigers".to_string(),
            session_name: "Bullpen".to_string(),
            date: "2025-04-01".to_string(),
            notes: String::new(),
            video,
            csv: None,
        }
    }

    #[test]
    fn test_missing_video_rejected() {
        assert!(matches!(
            validate(request(VideoInput::Missing)),
            Err(IngestError::MissingVideo)
        ));
        assert!(matches!(
            validate(request(VideoInput::Link("   ".to_string()))),
            Err(IngestError::MissingVideo)
        ));
        assert!(matches!(
            validate(request(VideoInput::File(Vec::new()))),
            Err(IngestError::MissingVideo)
        ));
    }

    #[test]
    fn test_link_without_scheme_rejected() {
        assert!(matches!(
            validate(request(VideoInput::Link("youtu.be/dQw4w9WgXcQ".to_string()))),
            Err(IngestError::InvalidLink(_))
        ));
    }

    #[test]
    fn test_bad_date_rejected() {
        let mut req = request(VideoInput::Link("https://youtu.be/dQw4w9WgXcQ".to_string()));
        req.date = "04/01/2025".to_string();
        assert!(matches!(validate(req), Err(IngestError::InvalidDate(_))));
    }

    #[test]
    fn test_blank_player_rejected() {
        let mut req = request(VideoInput::Link("https://youtu.be/dQw4w9WgXcQ".to_string()));
        req.player_name = "  ".to_string();
        assert!(matches!(validate(req), Err(IngestError::MissingField("Player name"))));
    }

    #[test]
    fn test_empty_csv_treated_as_absent() {
        let mut req = request(VideoInput::Link("https://youtu.be/dQw4w9WgXcQ".to_string()));
        req.csv = Some(Vec::new());
        assert!(validate(req).unwrap().csv.is_none());
    }
}
