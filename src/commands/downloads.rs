use anyhow::bail;
use serde::Serialize;
use tokio::sync::mpsc;

use mediafetch_core::core::format::{format_duration, format_views};
use mediafetch_core::fs_paths;
use mediafetch_core::models::media::{MediaKind, VideoMetadata};
use mediafetch_core::DownloadOutcome;

use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct PlatformInfo {
    pub kind: MediaKind,
    pub platform: Option<String>,
    pub supported: bool,
    pub video_id: Option<String>,
    pub embed_url: Option<String>,
}

pub fn detect_platform(state: &AppState, url: &str) -> PlatformInfo {
    let media = state.fetcher.classify(url);
    let supported = media.is_supported();
    let embed_url = media.embed_url();
    PlatformInfo {
        kind: media.kind,
        platform: media.platform.map(|p| p.to_string()),
        supported,
        video_id: media.video_id,
        embed_url,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaInfo {
    Video {
        metadata: VideoMetadata,
        duration: String,
        views: String,
        embed_url: Option<String>,
    },
    Image {
        preview_bytes: usize,
    },
}

/// Metadata for videos, a preview fetch for images.
pub async fn get_media_info(state: &AppState, url: &str) -> anyhow::Result<MediaInfo> {
    let media = state.fetcher.classify(url);
    match media.kind {
        MediaKind::Video => {
            let metadata = state.fetcher.metadata(url).await?;
            Ok(MediaInfo::Video {
                duration: format_duration(metadata.duration),
                views: format_views(Some(metadata.view_count)),
                embed_url: media.embed_url(),
                metadata,
            })
        }
        MediaKind::Image => {
            let bytes = state.fetcher.preview(url).await?;
            Ok(MediaInfo::Image {
                preview_bytes: bytes.len(),
            })
        }
        MediaKind::Unsupported => bail!("Unsupported URL: {}", url),
    }
}

/// Downloads `url` into the storage layout. `on_progress` runs on a separate
/// task and sees every accepted progress value, ending at 1.0 on success.
pub async fn download_from_url<F>(
    state: &AppState,
    url: &str,
    mut on_progress: F,
) -> anyhow::Result<DownloadOutcome>
where
    F: FnMut(f64) + Send + 'static,
{
    let media = state.fetcher.classify(url);
    let mut task = state.fetcher.new_task(&media)?;
    tracing::info!("[download] task {} ({:?}) for {}", task.id, task.kind, url);

    let (tx, mut rx) = mpsc::channel::<f64>(64);
    let forwarder = tokio::spawn(async move {
        while let Some(fraction) = rx.recv().await {
            on_progress(fraction);
        }
    });

    let result = state.fetcher.download(&mut task, Some(tx)).await;
    if let Err(e) = forwarder.await {
        tracing::warn!("[download] progress forwarder stopped: {}", e);
    }

    Ok(result?)
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadListing {
    pub videos: Vec<String>,
    pub images: Vec<String>,
}

pub fn list_downloads(state: &AppState) -> anyhow::Result<DownloadListing> {
    let layout = fs_paths::ensure_layout(&state.fetcher.layout().root)?;
    Ok(DownloadListing {
        videos: fs_paths::list_downloads(&layout.videos)?,
        images: fs_paths::list_downloads(&layout.images)?,
    })
}
