use crate::models::media::{MediaKind, MediaUrl};
use crate::platforms::Platform;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp"];

/// Classifies a URL as video, image or unsupported. Total over any input.
pub fn classify(url_str: &str) -> MediaUrl {
    let parsed = url::Url::parse(url_str).ok();

    let platform = parsed
        .as_ref()
        .and_then(|u| u.host_str())
        .and_then(Platform::from_host);

    if let Some(platform) = platform {
        return MediaUrl {
            raw: url_str.to_string(),
            kind: MediaKind::Video,
            platform: Some(platform),
            video_id: extract_video_id(url_str),
        };
    }

    let path = match &parsed {
        Some(u) => u.path().to_string(),
        None => bare_path(url_str).to_string(),
    };

    let kind = if has_image_extension(&path) {
        MediaKind::Image
    } else {
        MediaKind::Unsupported
    };

    MediaUrl {
        raw: url_str.to_string(),
        kind,
        platform: None,
        video_id: None,
    }
}

/// Video id for `youtu.be/{id}` short links and `youtube.com/watch?v={id}` pages.
pub fn extract_video_id(url_str: &str) -> Option<String> {
    let parsed = url::Url::parse(url_str).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    if host.contains("youtu.be") {
        return parsed
            .path_segments()?
            .filter(|s| !s.is_empty())
            .last()
            .map(|s| s.to_string());
    }

    if host.contains("youtube.com") {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.is_empty());
    }

    None
}

fn has_image_extension(path: &str) -> bool {
    let path = path.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

// Scheme-less input such as `example.com/cat.jpg` fails URL parsing; treat
// everything before the query or fragment as the path.
fn bare_path(raw: &str) -> &str {
    raw.split(['?', '#']).next().unwrap_or(raw)
}
