use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use mediafetch_core::core::ytdlp;
use mediafetch_core::fs_paths;

use crate::cli::{Cli, Commands, SettingsAction};
use crate::storage::config;
use crate::AppState;

pub mod downloads;
pub mod settings;

use downloads::{DownloadListing, MediaInfo, PlatformInfo};

pub async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let settings_path = config::settings_path()?;
    let root = cli.root.unwrap_or_else(fs_paths::default_root);
    let json = cli.json;
    let load_state = || AppState::new(config::load_settings(&settings_path), &root);

    match cli.command {
        Commands::Classify { url } => {
            let info = downloads::detect_platform(&load_state()?, &url);
            emit(json, &info, print_platform)
        }
        Commands::Info { url } => {
            let info = downloads::get_media_info(&load_state()?, &url).await?;
            emit(json, &info, print_media_info)
        }
        Commands::Download { url } => {
            let state = load_state()?;
            let line = ProgressLine::default();
            let sink = line.clone();
            let result = downloads::download_from_url(&state, &url, move |fraction| {
                sink.render(&mut std::io::stderr(), fraction)
            })
            .await;
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    line.close(&mut std::io::stderr());
                    return Err(e);
                }
            };
            if json {
                print_json(&outcome)
            } else {
                println!("{}", outcome.message());
                Ok(())
            }
        }
        Commands::List => {
            let listing = downloads::list_downloads(&load_state()?)?;
            emit(json, &listing, print_listing)
        }
        Commands::Paths => {
            let state = load_state()?;
            let layout = state.fetcher.layout();
            let paths = PathsReport {
                root: layout.root.clone(),
                videos: layout.videos.clone(),
                images: layout.images.clone(),
                settings: settings_path.clone(),
                ytdlp: state
                    .settings
                    .video
                    .ytdlp_path
                    .clone()
                    .or_else(ytdlp::managed_ytdlp_path),
            };
            emit(json, &paths, print_paths)
        }
        Commands::Settings { action } => {
            let current = match action {
                SettingsAction::Show => settings::get_settings(&settings_path),
                SettingsAction::Set { patch } => settings::update_settings(&settings_path, &patch)?,
                SettingsAction::Reset => settings::reset_settings(&settings_path)?,
            };
            print_json(&current)
        }
    }
}

#[derive(Debug, Serialize)]
struct PathsReport {
    root: PathBuf,
    videos: PathBuf,
    images: PathBuf,
    settings: PathBuf,
    ytdlp: Option<PathBuf>,
}

fn emit<T: Serialize>(json: bool, value: &T, human: fn(&T)) -> anyhow::Result<()> {
    if json {
        print_json(value)
    } else {
        human(value);
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_platform(info: &PlatformInfo) {
    println!("kind:     {}", format!("{:?}", info.kind).to_lowercase());
    println!("platform: {}", info.platform.as_deref().unwrap_or("-"));
    if let Some(id) = &info.video_id {
        println!("video id: {}", id);
    }
    if let Some(embed) = &info.embed_url {
        println!("embed:    {}", embed);
    }
}

fn print_media_info(info: &MediaInfo) {
    match info {
        MediaInfo::Video {
            metadata,
            duration,
            views,
            embed_url,
        } => {
            println!("Title:       {}", metadata.title);
            println!("Uploader:    {}", metadata.uploader);
            println!("Duration:    {}", duration);
            println!("Views:       {}", views);
            if let Some(thumb) = &metadata.thumbnail {
                println!("Thumbnail:   {}", thumb);
            }
            if let Some(embed) = embed_url {
                println!("Embed:       {}", embed);
            }
            println!();
            println!("{}", metadata.description);
        }
        MediaInfo::Image { preview_bytes } => {
            println!("Image preview loaded ({} bytes)", preview_bytes);
        }
    }
}

fn print_listing(listing: &DownloadListing) {
    for (label, names) in [("Videos", &listing.videos), ("Images", &listing.images)] {
        println!("{}:", label);
        if names.is_empty() {
            println!("  (none)");
        }
        for name in names {
            println!("  {}", name);
        }
    }
}

fn print_paths(paths: &PathsReport) {
    println!("root:     {}", paths.root.display());
    println!("videos:   {}", paths.videos.display());
    println!("images:   {}", paths.images.display());
    println!("settings: {}", paths.settings.display());
    match &paths.ytdlp {
        Some(p) => println!("yt-dlp:   {}", p.display()),
        None => println!("yt-dlp:   (PATH)"),
    }
}

/// Single carriage-return progress line. Reaching 1.0 ends the line; a failed
/// download ends it through [`close`](Self::close) so the error starts fresh.
#[derive(Clone, Default)]
struct ProgressLine {
    open: Arc<AtomicBool>,
}

impl ProgressLine {
    fn render<W: Write>(&self, out: &mut W, fraction: f64) {
        let _ = write!(out, "\r{:>5.1}%", fraction * 100.0);
        if fraction >= 1.0 {
            let _ = writeln!(out);
            self.open.store(false, Ordering::SeqCst);
        } else {
            self.open.store(true, Ordering::SeqCst);
        }
        let _ = out.flush();
    }

    fn close<W: Write>(&self, out: &mut W) {
        if self.open.swap(false, Ordering::SeqCst) {
            let _ = writeln!(out);
            let _ = out.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(steps: &[f64], close: bool) -> String {
        let line = ProgressLine::default();
        let mut out = Vec::new();
        for &fraction in steps {
            line.render(&mut out, fraction);
        }
        if close {
            line.close(&mut out);
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn completed_line_ends_with_newline() {
        assert_eq!(rendered(&[0.0, 1.0], false), "\r  0.0%\r100.0%\n");
    }

    #[test]
    fn interrupted_line_is_closed_before_errors() {
        assert_eq!(rendered(&[0.0, 0.5], true), "\r  0.0%\r 50.0%\n");
    }

    #[test]
    fn closing_after_completion_adds_nothing() {
        assert_eq!(rendered(&[0.25, 1.0], true), "\r 25.0%\r100.0%\n");
    }

    #[test]
    fn closing_without_progress_prints_nothing() {
        assert_eq!(rendered(&[], true), "");
    }
}
