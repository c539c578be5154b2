use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mediafetch", version, about = "Fetch videos and images from a URL")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Download root (defaults to ~/Downloads/StreamlitDownloads).
    #[arg(long, global = true, env = "MEDIAFETCH_ROOT")]
    pub root: Option<PathBuf>,

    /// Print results as JSON instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show how a URL is classified.
    Classify { url: String },
    /// Show video metadata, or fetch an image preview.
    Info { url: String },
    /// Download a video or image into the storage layout.
    Download { url: String },
    /// List downloaded videos and images.
    List,
    /// Print the storage and settings locations.
    Paths,
    /// Settings management.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    Show,
    /// Merge a JSON object into the stored settings.
    Set { patch: String },
    Reset,
}
