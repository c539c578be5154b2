use std::path::Path;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::models::download::BackendProgress;
use crate::models::media::{FetchedVideo, RawVideoInfo};

/// An external tool that can resolve a video page into metadata and bytes on disk.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Metadata only; nothing is downloaded.
    async fn probe(&self, url: &str) -> anyhow::Result<RawVideoInfo>;

    /// Downloads to `output_template`, a path whose file name still contains the
    /// backend placeholders for title and extension.
    async fn fetch(
        &self,
        url: &str,
        output_template: &Path,
        progress: mpsc::Sender<BackendProgress>,
    ) -> anyhow::Result<FetchedVideo>;
}
