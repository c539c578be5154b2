use std::path::{Path, PathBuf};

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::ytdlp::{self, YtDlpOptions};
use crate::models::download::BackendProgress;
use crate::models::media::{FetchedVideo, RawVideoInfo};
use crate::models::settings::Settings;
use crate::platforms::traits::VideoBackend;

/// Output template placeholders understood by yt-dlp.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

pub struct YtDlpBackend {
    binary_override: Option<PathBuf>,
    options: YtDlpOptions,
}

impl YtDlpBackend {
    pub fn new(settings: &Settings) -> Self {
        Self {
            binary_override: settings.video.ytdlp_path.clone(),
            options: YtDlpOptions::from_settings(settings),
        }
    }

    pub fn options(&self) -> &YtDlpOptions {
        &self.options
    }

    async fn binary(&self) -> anyhow::Result<PathBuf> {
        ytdlp::find_ytdlp(self.binary_override.as_deref())
            .await
            .ok_or_else(|| anyhow!("yt-dlp not found on PATH or in the managed bin directory"))
    }
}

impl Default for YtDlpBackend {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

#[async_trait]
impl VideoBackend for YtDlpBackend {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn probe(&self, url: &str) -> anyhow::Result<RawVideoInfo> {
        let binary = self.binary().await?;
        let json = ytdlp::get_video_info(&binary, url, &self.options).await?;
        Ok(RawVideoInfo::from_json(&json))
    }

    async fn fetch(
        &self,
        url: &str,
        output_template: &Path,
        progress: mpsc::Sender<BackendProgress>,
    ) -> anyhow::Result<FetchedVideo> {
        let binary = self.binary().await?;
        ytdlp::download_video(&binary, url, output_template, &self.options, progress).await
    }
}
