use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::anyhow;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::sync::mpsc;

use crate::core::process;
use crate::fs_paths;
use crate::models::download::{BackendProgress, DownloadPhase};
use crate::models::media::FetchedVideo;
use crate::models::settings::Settings;

const PROGRESS_PREFIX: &str = "[progress]";
const TITLE_PREFIX: &str = "[title]";
const FILE_PREFIX: &str = "[file]";

/// Flags shared by metadata probes and downloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YtDlpOptions {
    pub format: String,
    pub socket_timeout_secs: Option<u64>,
    pub proxy: Option<String>,
    pub extra_flags: Vec<String>,
}

impl YtDlpOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            format: settings.video.format.clone(),
            socket_timeout_secs: settings.network.request_timeout_secs,
            proxy: settings.network.proxy.url(),
            extra_flags: settings.video.extra_ytdlp_flags.clone(),
        }
    }

    fn network_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(secs) = self.socket_timeout_secs {
            args.push("--socket-timeout".to_string());
            args.push(secs.to_string());
        }
        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }
        args
    }
}

fn bin_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "yt-dlp.exe"
    } else {
        "yt-dlp"
    }
}

pub fn managed_ytdlp_path() -> Option<PathBuf> {
    fs_paths::managed_bin_dir().map(|d| d.join(bin_name()))
}

/// Resolves the yt-dlp binary: explicit override, then PATH, then the managed
/// bin dir.
pub async fn find_ytdlp(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.to_path_buf());
    }

    if let Ok(status) = process::command(bin_name())
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
    {
        if status.success() {
            return Some(PathBuf::from(bin_name()));
        }
    }

    let managed = managed_ytdlp_path()?;
    if managed.exists() {
        return Some(managed);
    }

    None
}

pub fn info_args(url: &str, opts: &YtDlpOptions) -> Vec<String> {
    let mut args = vec![
        "--dump-single-json".to_string(),
        "--flat-playlist".to_string(),
        "--no-playlist".to_string(),
        "--ignore-no-formats-error".to_string(),
        "--quiet".to_string(),
        "--no-warnings".to_string(),
        "-f".to_string(),
        opts.format.clone(),
    ];
    args.extend(opts.network_args());
    args.push(url.to_string());
    args
}

pub async fn get_video_info(
    ytdlp: &Path,
    url: &str,
    opts: &YtDlpOptions,
) -> anyhow::Result<serde_json::Value> {
    let args = info_args(url, opts);
    tracing::debug!("[ytdlp] {} {}", ytdlp.display(), args.join(" "));

    let output = process::command(ytdlp)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| anyhow!("failed to run yt-dlp: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("yt-dlp failed: {}", stderr.trim()));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| anyhow!("yt-dlp returned invalid JSON: {}", e))
}

pub fn download_args(url: &str, output_template: &Path, opts: &YtDlpOptions) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        opts.format.clone(),
        "--no-playlist".to_string(),
        "--windows-filenames".to_string(),
        "--no-warnings".to_string(),
        "--newline".to_string(),
        "--progress".to_string(),
        "--progress-template".to_string(),
        format!(
            "download:{} %(progress.status)s %(progress.downloaded_bytes)s %(progress.total_bytes)s",
            PROGRESS_PREFIX
        ),
        "--no-simulate".to_string(),
        "--print".to_string(),
        format!("after_move:{} %(title)s", TITLE_PREFIX),
        "--print".to_string(),
        format!("after_move:{} %(filepath)s", FILE_PREFIX),
        "-o".to_string(),
        output_template.to_string_lossy().to_string(),
    ];
    args.extend(opts.network_args());
    args.extend(opts.extra_flags.iter().cloned());
    args.push(url.to_string());
    args
}

/// Runs a download, forwarding byte counters as they are printed. The final
/// title and path are read back from yt-dlp's post-move output.
pub async fn download_video(
    ytdlp: &Path,
    url: &str,
    output_template: &Path,
    opts: &YtDlpOptions,
    progress: mpsc::Sender<BackendProgress>,
) -> anyhow::Result<FetchedVideo> {
    if let Some(dir) = output_template.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let args = download_args(url, output_template, opts);
    tracing::info!("[ytdlp] {} {}", ytdlp.display(), args.join(" "));

    let mut child = process::command(ytdlp)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| anyhow!("failed to start yt-dlp: {}", e))?;

    let stdout = child.stdout.take().ok_or_else(|| anyhow!("no stdout from yt-dlp"))?;
    let mut stderr = child.stderr.take().ok_or_else(|| anyhow!("no stderr from yt-dlp"))?;

    let stderr_reader = tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = stderr.read_to_end(&mut buf).await;
        String::from_utf8_lossy(&buf).into_owned()
    });

    let line_reader = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        let mut title = None;
        let mut file_path = None;
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_output_line(&line) {
                Some(OutputLine::Progress(p)) => {
                    let _ = progress.send(p).await;
                }
                Some(OutputLine::Title(t)) => title = Some(t),
                Some(OutputLine::File(f)) => file_path = Some(PathBuf::from(f)),
                None => {}
            }
        }
        (title, file_path)
    });

    let status = child
        .wait()
        .await
        .map_err(|e| anyhow!("yt-dlp process failed: {}", e))?;

    let (title, file_path) = line_reader.await.unwrap_or((None, None));
    let stderr = stderr_reader.await.unwrap_or_default();

    if !status.success() {
        let detail = last_error_line(&stderr).unwrap_or_else(|| format!("exited with {}", status));
        return Err(anyhow!("yt-dlp: {}", detail));
    }

    let title = title
        .or_else(|| {
            file_path
                .as_ref()
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
        })
        .ok_or_else(|| anyhow!("yt-dlp finished without reporting a title"))?;

    Ok(FetchedVideo { title, file_path })
}

#[derive(Debug, Clone, PartialEq)]
enum OutputLine {
    Progress(BackendProgress),
    Title(String),
    File(String),
}

fn parse_output_line(line: &str) -> Option<OutputLine> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix(PROGRESS_PREFIX) {
        return parse_progress(rest).map(OutputLine::Progress);
    }
    if let Some(rest) = line.strip_prefix(TITLE_PREFIX) {
        return Some(OutputLine::Title(rest.trim().to_string()));
    }
    if let Some(rest) = line.strip_prefix(FILE_PREFIX) {
        return Some(OutputLine::File(rest.trim().to_string()));
    }
    None
}

// "<status> <downloaded_bytes> <total_bytes>", unknown numbers print as "NA".
fn parse_progress(rest: &str) -> Option<BackendProgress> {
    let mut parts = rest.split_whitespace();
    let phase = match parts.next()? {
        "downloading" => DownloadPhase::Downloading,
        "finished" => DownloadPhase::Finished,
        "processing" | "postprocessing" => DownloadPhase::PostProcessing,
        _ => DownloadPhase::Other,
    };
    let downloaded_bytes = parse_bytes(parts.next()?)?;
    let total_bytes = parts.next().and_then(parse_bytes);

    Some(BackendProgress {
        phase,
        downloaded_bytes,
        total_bytes,
    })
}

// yt-dlp may print integer counters as floats ("1024.0").
fn parse_bytes(s: &str) -> Option<u64> {
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f as u64)
}

fn last_error_line(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.starts_with("ERROR"))
        .or_else(|| stderr.lines().rev().map(str::trim).find(|l| !l.is_empty()))
        .map(|l| l.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_downloading_line() {
        assert_eq!(
            parse_output_line("[progress] downloading 1024 4096"),
            Some(OutputLine::Progress(BackendProgress::downloading(1024, Some(4096))))
        );
    }

    #[test]
    fn unknown_total_is_none() {
        assert_eq!(
            parse_output_line("[progress] downloading 2048 NA"),
            Some(OutputLine::Progress(BackendProgress::downloading(2048, None)))
        );
    }

    #[test]
    fn float_counters_are_accepted() {
        assert_eq!(
            parse_output_line("  [progress] downloading 10.0 20.0  "),
            Some(OutputLine::Progress(BackendProgress::downloading(10, Some(20))))
        );
    }

    #[test]
    fn finished_phase_has_no_fraction() {
        let Some(OutputLine::Progress(p)) = parse_output_line("[progress] finished 10 10") else {
            panic!("expected progress line");
        };
        assert_eq!(p.phase, DownloadPhase::Finished);
        assert_eq!(p.fraction(), None);
    }

    #[test]
    fn parses_title_and_file_lines() {
        assert_eq!(
            parse_output_line("[title] My Video: Part 1"),
            Some(OutputLine::Title("My Video: Part 1".into()))
        );
        assert_eq!(
            parse_output_line("[file] /dl/Videos/My Video.mp4"),
            Some(OutputLine::File("/dl/Videos/My Video.mp4".into()))
        );
    }

    #[test]
    fn ignores_other_output() {
        assert_eq!(parse_output_line("[Merger] Merging formats into \"x.mp4\""), None);
        assert_eq!(parse_output_line(""), None);
        assert_eq!(parse_output_line("[progress] downloading NA NA"), None);
    }

    #[test]
    fn info_args_are_quiet_and_flat() {
        let opts = YtDlpOptions {
            format: "best".into(),
            socket_timeout_secs: Some(15),
            ..YtDlpOptions::default()
        };
        let args = info_args("https://youtu.be/x", &opts);
        for flag in ["--dump-single-json", "--flat-playlist", "--quiet", "--no-warnings"] {
            assert!(args.iter().any(|a| a == flag), "missing {}", flag);
        }
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/x"));
        let pos = args.iter().position(|a| a == "--socket-timeout").unwrap();
        assert_eq!(args[pos + 1], "15");
    }

    #[test]
    fn download_args_use_output_template() {
        let opts = YtDlpOptions {
            format: "best".into(),
            proxy: Some("socks5://127.0.0.1:1080".into()),
            extra_flags: vec!["--limit-rate".into(), "1M".into()],
            ..YtDlpOptions::default()
        };
        let template = Path::new("/dl/Videos/%(title)s.%(ext)s");
        let args = download_args("https://youtu.be/x", template, &opts);

        let pos = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[pos + 1], "/dl/Videos/%(title)s.%(ext)s");
        assert!(args.iter().any(|a| a == "--proxy"));
        assert!(args.iter().any(|a| a == "--limit-rate"));
        assert!(!args.iter().any(|a| a == "--socket-timeout"));
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/x"));
    }

    #[test]
    fn last_error_line_prefers_error_prefix() {
        let stderr = "WARNING: something\nERROR: [youtube] x: Video unavailable\n\n";
        assert_eq!(
            last_error_line(stderr).as_deref(),
            Some("ERROR: [youtube] x: Video unavailable")
        );
        assert_eq!(last_error_line("plain failure\n").as_deref(), Some("plain failure"));
        assert_eq!(last_error_line(""), None);
    }

    #[test]
    fn options_from_settings() {
        let mut settings = Settings::default();
        settings.network.request_timeout_secs = Some(9);
        let opts = YtDlpOptions::from_settings(&settings);
        assert_eq!(opts.format, "best");
        assert_eq!(opts.socket_timeout_secs, Some(9));
        assert_eq!(opts.proxy, None);
    }
}
