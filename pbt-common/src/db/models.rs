//! Database models

use crate::storage::StorageKey;
use crate::video::VideoSource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub team: String,
    pub notes: String,
}

/// Player row plus how many sessions reference it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    #[serde(flatten)]
    pub player: Player,
    pub session_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub player_id: i64,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    pub session_name: String,
    /// Remote URL or local path, see [`VideoSource::classify`]
    pub video_source: String,
    pub kinovea_csv: Option<String>,
    pub notes: String,
    pub storage_key: String,
}

impl Session {
    /// Display label, `"<date> - <session_name>"`
    pub fn label(&self) -> String {
        session_label(&self.date, &self.session_name)
    }

    pub fn video(&self) -> VideoSource {
        VideoSource::classify(&self.video_source)
    }

    pub fn csv_path(&self) -> Option<PathBuf> {
        self.kinovea_csv.as_deref().map(PathBuf::from)
    }
}

/// Values for a session row about to be inserted
#[derive(Debug, Clone)]
pub struct NewSession {
    pub player_id: i64,
    pub date: String,
    pub session_name: String,
    pub video_source: VideoSource,
    pub kinovea_csv: Option<PathBuf>,
    pub notes: String,
    pub storage_key: StorageKey,
}

pub fn session_label(date: &str, session_name: &str) -> String {
    format!("{} - {}", date, session_name)
}

/// Natural-key normalization for player name and team
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_format() {
        assert_eq!(session_label("2025-03-01", "Bullpen 1"), "2025-03-01 - Bullpen 1");
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Shohei OHTANI "), "shohei ohtani");
        assert_eq!(normalize_key("Ángel"), "ángel");
    }
}
