use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::direct_downloader;
use crate::core::error::{describe, DownloadError, FetchError};
use crate::core::http_client;
use crate::core::metadata;
use crate::core::progress::ProgressReporter;
use crate::core::url_parser;
use crate::fs_paths::{self, StorageLayout};
use crate::models::download::DownloadTask;
use crate::models::media::{FetchedVideo, ImageFile, MediaKind, MediaUrl, VideoMetadata};
use crate::models::settings::Settings;
use crate::platforms::generic_ytdlp::{YtDlpBackend, OUTPUT_TEMPLATE};
use crate::platforms::traits::VideoBackend;

const PROGRESS_BUFFER: usize = 64;

/// Video strategy: hands the transfer to `backend` and turns its byte counters
/// into task progress.
pub async fn download_video(
    backend: &dyn VideoBackend,
    task: &mut DownloadTask,
    observer: Option<mpsc::Sender<f64>>,
) -> Result<FetchedVideo, DownloadError> {
    if !task.start() {
        return Err(DownloadError::Video(format!(
            "task {} cannot start from {:?}",
            task.id, task.status
        )));
    }
    let reporter = ProgressReporter::new(observer);
    reporter.started(task).await;

    let url = task.url.clone();
    let template = task.output_dir.join(OUTPUT_TEMPLATE);
    tracing::info!("[video] {} -> {} via {}", url, template.display(), backend.name());

    let (tx, rx) = mpsc::channel(PROGRESS_BUFFER);
    let (result, ()) = tokio::join!(
        backend.fetch(&url, &template, tx),
        reporter.pump_backend(task, rx)
    );

    match result {
        Ok(video) => {
            let filename = video
                .file_path
                .as_deref()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| video.title.clone());
            reporter.finished(task, &filename).await;
            tracing::info!("[video] done: {}", video.title);
            Ok(video)
        }
        Err(e) => {
            let err = DownloadError::Video(describe(&e));
            tracing::error!("[video] {} failed: {}", url, err);
            task.fail(err.to_string());
            Err(err)
        }
    }
}

/// Image strategy: direct streamed GET into the task's output directory.
pub async fn download_image(
    client: &reqwest::Client,
    task: &mut DownloadTask,
    observer: Option<mpsc::Sender<f64>>,
) -> Result<ImageFile, DownloadError> {
    if !task.start() {
        return Err(DownloadError::Image(format!(
            "task {} cannot start from {:?}",
            task.id, task.status
        )));
    }
    let reporter = ProgressReporter::new(observer);
    reporter.started(task).await;

    let url = task.url.clone();
    let output_dir = task.output_dir.clone();
    tracing::info!("[image] {} -> {}", url, output_dir.display());

    let (tx, rx) = mpsc::channel(PROGRESS_BUFFER);
    let (result, ()) = tokio::join!(
        direct_downloader::download_image(client, &url, &output_dir, tx),
        reporter.pump_fractions(task, rx)
    );

    match result {
        Ok(file) => {
            reporter.finished(task, &file.filename).await;
            tracing::info!("[image] done: {} ({} bytes)", file.filename, file.bytes_written);
            Ok(file)
        }
        Err(e) => {
            let err = DownloadError::Image(describe(&e));
            tracing::error!("[image] {} failed: {}", url, err);
            task.fail(err.to_string());
            Err(err)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DownloadOutcome {
    Video(FetchedVideo),
    Image(ImageFile),
}

impl DownloadOutcome {
    pub fn message(&self) -> String {
        match self {
            DownloadOutcome::Video(v) => format!("Successfully downloaded: {}", v.title),
            DownloadOutcome::Image(i) => format!("Successfully downloaded: {}", i.filename),
        }
    }
}

/// Everything a caller needs for one URL at a time: classification, metadata,
/// previews and downloads into the storage layout.
pub struct Fetcher {
    client: reqwest::Client,
    backend: Arc<dyn VideoBackend>,
    layout: StorageLayout,
}

impl Fetcher {
    pub fn new(client: reqwest::Client, backend: Arc<dyn VideoBackend>, layout: StorageLayout) -> Self {
        Self {
            client,
            backend,
            layout,
        }
    }

    /// Builds the HTTP client and yt-dlp backend from settings and makes sure
    /// the directory tree under `root` exists.
    pub fn from_settings(settings: &Settings, root: &Path) -> anyhow::Result<Self> {
        let client = http_client::build_client(&settings.network)?;
        let layout = fs_paths::ensure_layout(root)?;
        Ok(Self::new(client, Arc::new(YtDlpBackend::new(settings)), layout))
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn classify(&self, url: &str) -> MediaUrl {
        url_parser::classify(url)
    }

    pub async fn metadata(&self, url: &str) -> Result<VideoMetadata, FetchError> {
        metadata::fetch_metadata(self.backend.as_ref(), url).await
    }

    pub async fn preview(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        direct_downloader::fetch_preview(&self.client, url)
            .await
            .map_err(|e| FetchError::Preview(describe(&e)))
    }

    pub fn new_task(&self, media: &MediaUrl) -> Result<DownloadTask, DownloadError> {
        let dir = self
            .layout
            .dir_for(media.kind)
            .ok_or_else(|| DownloadError::Unsupported(media.raw.clone()))?;
        Ok(DownloadTask::new(media.raw.clone(), media.kind, dir))
    }

    pub async fn download(
        &self,
        task: &mut DownloadTask,
        observer: Option<mpsc::Sender<f64>>,
    ) -> Result<DownloadOutcome, DownloadError> {
        if let Err(e) = fs_paths::ensure_layout(&self.layout.root) {
            let err = DownloadError::from(e);
            task.fail(err.to_string());
            return Err(err);
        }

        match task.kind {
            MediaKind::Video => download_video(self.backend.as_ref(), task, observer)
                .await
                .map(DownloadOutcome::Video),
            MediaKind::Image => download_image(&self.client, task, observer)
                .await
                .map(DownloadOutcome::Image),
            MediaKind::Unsupported => {
                let err = DownloadError::Unsupported(task.url.clone());
                task.fail(err.to_string());
                Err(err)
            }
        }
    }
}
