use std::path::Path;

use anyhow::Context;
use mediafetch_core::models::settings::Settings;

use crate::storage::config;

pub fn get_settings(path: &Path) -> Settings {
    config::load_settings(path)
}

/// Merges a JSON object into the stored settings and saves the result.
/// Nested objects merge key by key; anything else replaces the old value.
pub fn update_settings(path: &Path, partial: &str) -> anyhow::Result<Settings> {
    let current = config::load_settings(path);

    let patch: serde_json::Value = serde_json::from_str(partial).context("Invalid JSON")?;
    let mut current_val = serde_json::to_value(&current)?;
    merge_json(&mut current_val, &patch);
    let updated: Settings =
        serde_json::from_value(current_val).context("Patch does not fit the settings schema")?;

    config::save_settings(path, &updated)?;
    tracing::info!("settings updated at {}", path.display());
    Ok(updated)
}

pub fn reset_settings(path: &Path) -> anyhow::Result<Settings> {
    let defaults = Settings::default();
    config::save_settings(path, &defaults)?;
    Ok(defaults)
}

fn merge_json(base: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            match base_obj.get_mut(key) {
                Some(existing) if existing.is_object() && value.is_object() => {
                    merge_json(existing, value)
                }
                _ => {
                    base_obj.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_keeps_sibling_keys() {
        let mut base = json!({"network": {"proxy": {"host": "a", "port": 1}, "user_agent": null}});
        merge_json(&mut base, &json!({"network": {"proxy": {"port": 2}}}));
        assert_eq!(
            base,
            json!({"network": {"proxy": {"host": "a", "port": 2}, "user_agent": null}})
        );
    }

    #[test]
    fn update_applies_nested_patch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let updated =
            update_settings(&path, r#"{"network": {"request_timeout_secs": 15}}"#).unwrap();

        assert_eq!(updated.network.request_timeout_secs, Some(15));
        assert_eq!(updated.video.format, "best");
        assert_eq!(get_settings(&path), updated);
    }

    #[test]
    fn update_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let err = update_settings(&path, "{oops").unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
        assert!(!path.exists());
    }

    #[test]
    fn update_rejects_wrong_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert!(update_settings(&path, r#"{"video": {"format": 5}}"#).is_err());
    }

    #[test]
    fn reset_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        update_settings(&path, r#"{"video": {"format": "worst"}}"#).unwrap();

        let reset = reset_settings(&path).unwrap();

        assert_eq!(reset, Settings::default());
        assert_eq!(get_settings(&path), Settings::default());
    }
}
