use thiserror::Error;

/// Metadata lookup failed. No partial metadata accompanies it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Error fetching video info: {0}")]
    Backend(String),
    #[error("Error loading image preview: {0}")]
    Preview(String),
}

/// A transfer could not start or stopped partway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("Error downloading video: {0}")]
    Video(String),
    #[error("Error downloading image: {0}")]
    Image(String),
    #[error("Error writing download: {0}")]
    Io(String),
    #[error("Unsupported URL: {0}")]
    Unsupported(String),
}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

// anyhow's alternate formatting keeps the whole context chain on one line.
pub(crate) fn describe(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}
