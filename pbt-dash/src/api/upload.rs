//! Session upload
//!
//! Multipart form handler. Field names mirror the upload tab:
//! `player_name`, `team`, `session_name`, `date`, `notes`, `video_source`
//! (`link` or `file`), `video_link`, `video_file`, `csv_file`.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use crate::services::ingest::{self, IngestOutcome, IngestRequest, VideoInput};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Default)]
struct UploadForm {
    player_name: String,
    team: String,
    session_name: String,
    date: String,
    notes: String,
    video_source: Option<String>,
    video_link: Option<String>,
    video_file: Option<Vec<u8>>,
    csv_file: Option<Vec<u8>>,
}

impl UploadForm {
    fn into_request(self) -> IngestRequest {
        let link = self.video_link.filter(|l| !l.trim().is_empty());
        let file = self.video_file.filter(|b| !b.is_empty());

        // An explicit choice wins; otherwise take whichever was supplied
        let video = match self.video_source.as_deref().map(str::trim) {
            Some("link") => link.map(VideoInput::Link),
            Some("file") => file.map(VideoInput::File),
            _ => link.map(VideoInput::Link).or(file.map(VideoInput::File)),
        }
        .unwrap_or(VideoInput::Missing);

        IngestRequest {
            player_name: self.player_name,
            team: self.team,
            session_name: self.session_name,
            date: self.date,
            notes: self.notes,
            video,
            csv: self.csv_file,
        }
    }
}

fn bad_multipart(e: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Malformed upload: {}", e))
}

async fn read_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video_file" | "csv_file" => {
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                // Browsers send an empty part when no file is chosen
                let bytes = (!bytes.is_empty()).then(|| bytes.to_vec());
                if name == "video_file" {
                    form.video_file = bytes;
                } else {
                    form.csv_file = bytes;
                }
            }
            _ => {
                let text = field.text().await.map_err(bad_multipart)?;
                match name.as_str() {
                    "player_name" => form.player_name = text,
                    "team" => form.team = text,
                    "session_name" => form.session_name = text,
                    "date" => form.date = text,
                    "notes" => form.notes = text,
                    "video_source" => form.video_source = Some(text),
                    "video_link" => form.video_link = Some(text),
                    other => debug!(field = other, "Ignoring unknown upload field"),
                }
            }
        }
    }

    Ok(form)
}

/// POST /api/sessions
///
/// Stores the uploaded files and inserts one session, creating the player
/// when no case-insensitive (name, team) match exists.
pub async fn upload_session(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<IngestOutcome>)> {
    let form = read_form(multipart).await?;
    let outcome = ingest::ingest_session(&state.db, &state.store, form.into_request()).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_link_choice_ignores_file() {
        let form = UploadForm {
            video_source: Some("link".to_string()),
            video_link: Some("https://youtu.be/abc".to_string()),
            video_file: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        assert_eq!(
            form.into_request().video,
            VideoInput::Link("https://youtu.be/abc".to_string())
        );
    }

    #[test]
    fn test_file_choice_without_file_is_missing() {
        let form = UploadForm {
            video_source: Some("file".to_string()),
            video_link: Some("https://youtu.be/abc".to_string()),
            ..Default::default()
        };
        assert_eq!(form.into_request().video, VideoInput::Missing);
    }

    #[test]
    fn test_no_choice_falls_back_to_supplied_input() {
        let form = UploadForm {
            video_file: Some(vec![0u8; 4]),
            ..Default::default()
        };
        assert_eq!(form.into_request().video, VideoInput::File(vec![0u8; 4]));

        let blank = UploadForm {
            video_link: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.into_request().video, VideoInput::Missing);
    }
}
