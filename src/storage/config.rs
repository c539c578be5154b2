use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use mediafetch_core::fs_paths;
use mediafetch_core::models::settings::Settings;

const SETTINGS_FILE: &str = "settings.json";

pub fn settings_path() -> anyhow::Result<PathBuf> {
    fs_paths::app_data_dir()
        .map(|dir| dir.join(SETTINGS_FILE))
        .ok_or_else(|| anyhow!("no data directory available for settings"))
}

/// Reads settings from `path`. A missing or unreadable file yields defaults.
pub fn load_settings(path: &Path) -> Settings {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return Settings::default(),
    };

    match serde_json::from_str::<Settings>(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("ignoring corrupt settings at {}: {}", path.display(), e);
            Settings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
