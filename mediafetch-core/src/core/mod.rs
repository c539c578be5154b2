pub mod direct_downloader;
pub mod engine;
pub mod error;
pub mod filename;
pub mod format;
pub mod http_client;
pub mod metadata;
pub mod process;
pub mod progress;
pub mod url_parser;
pub mod ytdlp;
