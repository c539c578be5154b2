use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::platforms::Platform;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const NO_DESCRIPTION: &str = "No description available";
pub const UNKNOWN_UPLOADER: &str = "Unknown uploader";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Image,
    Unsupported,
}

/// A user-submitted URL together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUrl {
    pub raw: String,
    pub kind: MediaKind,
    pub platform: Option<Platform>,
    pub video_id: Option<String>,
}

impl MediaUrl {
    pub fn is_supported(&self) -> bool {
        self.kind != MediaKind::Unsupported
    }

    pub fn embed_url(&self) -> Option<String> {
        let id = self.video_id.as_deref()?;
        self.platform?.embed_url(id)
    }
}

/// Backend response as reported, before any defaulting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVideoInfo {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub description: Option<String>,
    pub uploader: Option<String>,
    pub view_count: Option<u64>,
}

impl RawVideoInfo {
    pub fn from_json(json: &serde_json::Value) -> Self {
        let text = |key: &str| json.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());

        Self {
            title: text("title"),
            thumbnail: text("thumbnail"),
            duration: json.get("duration").and_then(|v| v.as_f64()),
            description: text("description"),
            uploader: text("uploader"),
            view_count: json.get("view_count").and_then(|v| v.as_u64()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub thumbnail: Option<String>,
    pub duration: Option<u64>,
    pub description: String,
    pub uploader: String,
    pub view_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedVideo {
    pub title: String,
    pub file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFile {
    pub filename: String,
    pub file_path: PathBuf,
    pub bytes_written: u64,
}
