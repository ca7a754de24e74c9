//! Uploaded file storage
//!
//! Uploaded kinematic CSVs and videos are written under the configured data
//! and video directories, named by an opaque storage key rather than by the
//! player or session name supplied in the form.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Extension given to every uploaded video regardless of its original container
pub const VIDEO_EXTENSION: &str = "mp4";
pub const CSV_EXTENSION: &str = "csv";

/// Opaque identifier naming a session's stored files
///
/// The text form names the files, fills the `storage_key` column and is what
/// serializes, so all three always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct StorageKey(Uuid);

impl StorageKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_simple())
    }
}

impl From<StorageKey> for String {
    fn from(key: StorageKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for StorageKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
            .ok_or_else(|| Error::InvalidInput(format!("Invalid storage key '{}'", value)))
    }
}

/// Filesystem layout for uploaded session files
#[derive(Debug, Clone)]
pub struct FileStore {
    video_dir: PathBuf,
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(video_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            video_dir: video_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn video_dir(&self) -> &Path {
        &self.video_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn csv_path(&self, key: StorageKey) -> PathBuf {
        self.data_dir.join(format!("{}.{}", key, CSV_EXTENSION))
    }

    pub fn video_path(&self, key: StorageKey) -> PathBuf {
        self.video_dir.join(format!("{}.{}", key, VIDEO_EXTENSION))
    }

    /// Write raw CSV bytes for `key`, returning the stored path
    pub async fn write_csv(&self, key: StorageKey, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.csv_path(key);
        write_file(&path, bytes).await?;
        Ok(path)
    }

    /// Write raw video bytes for `key`, returning the stored path
    pub async fn write_video(&self, key: StorageKey, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.video_path(key);
        write_file(&path, bytes).await?;
        Ok(path)
    }

    /// File name to serve under the media route, when `path` lives directly
    /// in the video directory
    pub fn media_name(&self, path: &Path) -> Option<String> {
        if path.parent()? != self.video_dir.as_path() {
            return None;
        }
        path.file_name().map(|n| n.to_string_lossy().into_owned())
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "Stored upload");
    Ok(())
}

/// True when `path` currently exists on disk
pub async fn resolves(path: impl AsRef<Path>) -> bool {
    tokio::fs::try_exists(path.as_ref()).await.unwrap_or(false)
}

/// Remove a stored file. Returns `false` when there was nothing to remove.
pub async fn remove_if_present(path: impl AsRef<Path>) -> Result<bool> {
    match tokio::fs::remove_file(path.as_ref()).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileStore {
        FileStore::new(dir.path().join("videos"), dir.path().join("data"))
    }

    #[test]
    fn test_storage_key_round_trips_through_text() {
        let key = StorageKey::generate();
        assert_eq!(StorageKey::parse(&key.to_string()), Some(key));
        assert_eq!(StorageKey::parse("../../etc/passwd"), None);
    }

    #[test]
    fn test_serialized_key_matches_file_name() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let key = StorageKey::generate();

        let json = serde_json::to_value(key).unwrap();
        let stem = store.csv_path(key).file_stem().unwrap().to_string_lossy().into_owned();
        assert_eq!(json, serde_json::Value::String(stem));

        let back: StorageKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<StorageKey>("\"not-a-key\"").is_err());
    }

    #[test]
    fn test_paths_use_key_not_user_input() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let key = StorageKey::generate();

        let csv = store.csv_path(key);
        assert_eq!(csv.parent(), Some(store.data_dir()));
        assert_eq!(csv.extension().unwrap(), "csv");

        let video = store.video_path(key);
        assert_eq!(video.parent(), Some(store.video_dir()));
        assert_eq!(video.extension().unwrap(), "mp4");
    }

    #[tokio::test]
    async fn test_write_and_remove_csv() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let key = StorageKey::generate();

        let path = store.write_csv(key, b"Time (ms),TE\n0,1\n").await.unwrap();
        assert!(resolves(&path).await);

        assert!(remove_if_present(&path).await.unwrap());
        assert!(!resolves(&path).await);
        assert!(!remove_if_present(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_media_name_only_for_video_dir() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let key = StorageKey::generate();

        let video = store.write_video(key, b"not really mp4").await.unwrap();
        assert_eq!(store.media_name(&video), Some(format!("{}.mp4", key)));
        assert_eq!(store.media_name(Path::new("/tmp/elsewhere.mp4")), None);
    }
}
