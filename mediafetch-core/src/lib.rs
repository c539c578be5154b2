pub mod core;
pub mod fs_paths;
pub mod models;
pub mod platforms;

pub use crate::core::engine::{DownloadOutcome, Fetcher};
pub use crate::core::error::{DownloadError, FetchError};
pub use crate::core::url_parser::{classify, extract_video_id};
