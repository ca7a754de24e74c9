//! Video source classification
//!
//! A session's video is either a remote link or a path to a local file,
//! never both. Anything beginning with an HTTP scheme is remote.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Short-link, watch-URL and shorts-URL shapes, tried in order
static YOUTUBE_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"youtu\.be/([a-zA-Z0-9_-]{11})",
        r"v=([a-zA-Z0-9_-]{11})",
        r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// Where a session's video lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VideoSource {
    Remote(String),
    Local(PathBuf),
}

impl VideoSource {
    /// Classify a stored `video_source` column value
    pub fn classify(stored: &str) -> Self {
        if is_remote(stored) {
            VideoSource::Remote(stored.to_string())
        } else {
            VideoSource::Local(PathBuf::from(stored))
        }
    }

    /// Value persisted in the `video_source` column
    pub fn as_stored(&self) -> String {
        match self {
            VideoSource::Remote(url) => url.clone(),
            VideoSource::Local(path) => path.to_string_lossy().into_owned(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, VideoSource::Remote(_))
    }
}

/// True when `source` starts with an HTTP scheme
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http")
}

/// Extract the 11-character YouTube video id, if any pattern matches
pub fn extract_youtube_id(url: &str) -> Option<String> {
    YOUTUBE_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Embeddable player URL for a video id
pub fn embed_url(video_id: &str) -> String {
    format!("{}{}", EMBED_BASE, video_id)
}
