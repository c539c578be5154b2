use std::io;
use std::path::{Path, PathBuf};

use crate::models::media::MediaKind;

pub const ROOT_DIR_NAME: &str = "StreamlitDownloads";
pub const VIDEOS_DIR_NAME: &str = "Videos";
pub const IMAGES_DIR_NAME: &str = "Images";

const APP_DIR_NAME: &str = "mediafetch";
const DATA_DIR_ENV: &str = "MEDIAFETCH_DATA_DIR";

/// `{home}/Downloads/StreamlitDownloads`.
pub fn default_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Downloads")
        .join(ROOT_DIR_NAME)
}

/// Where settings and managed tools live.
pub fn app_data_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    dirs::data_dir().map(|d| d.join(APP_DIR_NAME))
}

pub fn managed_bin_dir() -> Option<PathBuf> {
    app_data_dir().map(|d| d.join("bin"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub root: PathBuf,
    pub videos: PathBuf,
    pub images: PathBuf,
}

impl StorageLayout {
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            videos: root.join(VIDEOS_DIR_NAME),
            images: root.join(IMAGES_DIR_NAME),
            root,
        }
    }

    pub fn dir_for(&self, kind: MediaKind) -> Option<&Path> {
        match kind {
            MediaKind::Video => Some(&self.videos),
            MediaKind::Image => Some(&self.images),
            MediaKind::Unsupported => None,
        }
    }
}

/// Creates `root`, `root/Videos` and `root/Images` if missing. Safe to call on
/// every invocation.
pub fn ensure_layout(root: &Path) -> io::Result<StorageLayout> {
    let layout = StorageLayout::for_root(root);
    for dir in [&layout.root, &layout.videos, &layout.images] {
        std::fs::create_dir_all(dir)?;
    }
    tracing::debug!("storage layout ready at {}", layout.root.display());
    Ok(layout)
}

/// File names in `dir`, sorted by name.
pub fn list_downloads(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
