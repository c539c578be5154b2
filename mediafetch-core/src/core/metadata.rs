use crate::core::error::{describe, FetchError};
use crate::models::media::{
    RawVideoInfo, VideoMetadata, NO_DESCRIPTION, UNKNOWN_TITLE, UNKNOWN_UPLOADER,
};
use crate::platforms::traits::VideoBackend;

/// Looks up descriptive metadata for a video URL. Missing fields get their
/// defaults; only a failure of the backend itself is an error.
pub async fn fetch_metadata(
    backend: &dyn VideoBackend,
    url: &str,
) -> Result<VideoMetadata, FetchError> {
    tracing::info!("[metadata] probing {} via {}", url, backend.name());
    match backend.probe(url).await {
        Ok(raw) => Ok(VideoMetadata::from(raw)),
        Err(e) => {
            let message = describe(&e);
            tracing::warn!("[metadata] {} failed: {}", url, message);
            Err(FetchError::Backend(message))
        }
    }
}

impl From<RawVideoInfo> for VideoMetadata {
    fn from(raw: RawVideoInfo) -> Self {
        Self {
            title: non_blank(raw.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            thumbnail: non_blank(raw.thumbnail),
            duration: raw
                .duration
                .filter(|d| d.is_finite() && *d >= 0.0)
                .map(|d| d as u64),
            description: non_blank(raw.description)
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            uploader: non_blank(raw.uploader).unwrap_or_else(|| UNKNOWN_UPLOADER.to_string()),
            view_count: raw.view_count.unwrap_or(0),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::download::BackendProgress;
    use crate::models::media::FetchedVideo;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::path::Path;
    use tokio::sync::mpsc;

    struct CannedBackend(Option<RawVideoInfo>);

    #[async_trait]
    impl VideoBackend for CannedBackend {
        fn name(&self) -> &str {
            "canned"
        }

        async fn probe(&self, _url: &str) -> anyhow::Result<RawVideoInfo> {
            self.0
                .clone()
                .ok_or_else(|| anyhow!("ERROR: Video unavailable in your country"))
        }

        async fn fetch(
            &self,
            _url: &str,
            _output_template: &Path,
            _progress: mpsc::Sender<BackendProgress>,
        ) -> anyhow::Result<FetchedVideo> {
            Err(anyhow!("not used"))
        }
    }

    #[tokio::test]
    async fn maps_full_response() {
        let backend = CannedBackend(Some(RawVideoInfo {
            title: Some("Talk".into()),
            thumbnail: Some("https://i.ytimg.com/vi/abc/hq.jpg".into()),
            duration: Some(3661.0),
            description: Some("About things".into()),
            uploader: Some("Channel".into()),
            view_count: Some(2_300_000),
        }));

        let meta = fetch_metadata(&backend, "https://youtu.be/abc").await.unwrap();

        assert_eq!(meta.title, "Talk");
        assert_eq!(meta.thumbnail.as_deref(), Some("https://i.ytimg.com/vi/abc/hq.jpg"));
        assert_eq!(meta.duration, Some(3661));
        assert_eq!(meta.description, "About things");
        assert_eq!(meta.uploader, "Channel");
        assert_eq!(meta.view_count, 2_300_000);
    }

    #[tokio::test]
    async fn empty_response_uses_defaults() {
        let backend = CannedBackend(Some(RawVideoInfo::default()));

        let meta = fetch_metadata(&backend, "https://vimeo.com/1").await.unwrap();

        assert_eq!(meta.title, UNKNOWN_TITLE);
        assert_eq!(meta.thumbnail, None);
        assert_eq!(meta.duration, None);
        assert_eq!(meta.description, NO_DESCRIPTION);
        assert_eq!(meta.uploader, UNKNOWN_UPLOADER);
        assert_eq!(meta.view_count, 0);
    }

    #[tokio::test]
    async fn backend_failure_is_a_fetch_error() {
        let backend = CannedBackend(None);

        let err = fetch_metadata(&backend, "https://youtu.be/blocked").await.unwrap_err();

        assert_eq!(
            err,
            FetchError::Backend("ERROR: Video unavailable in your country".into())
        );
        assert!(err.to_string().starts_with("Error fetching video info:"));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let meta = VideoMetadata::from(RawVideoInfo {
            title: Some("   ".into()),
            uploader: Some(String::new()),
            ..RawVideoInfo::default()
        });
        assert_eq!(meta.title, UNKNOWN_TITLE);
        assert_eq!(meta.uploader, UNKNOWN_UPLOADER);
    }

    #[test]
    fn invalid_durations_are_dropped() {
        for d in [-5.0, f64::NAN, f64::INFINITY] {
            let meta = VideoMetadata::from(RawVideoInfo {
                duration: Some(d),
                ..RawVideoInfo::default()
            });
            assert_eq!(meta.duration, None);
        }
    }

    #[test]
    fn fractional_duration_truncates() {
        let meta = VideoMetadata::from(RawVideoInfo {
            duration: Some(65.9),
            ..RawVideoInfo::default()
        });
        assert_eq!(meta.duration, Some(65));
    }
}
