use std::fmt;

use serde::{Deserialize, Serialize};

pub mod generic_ytdlp;
pub mod traits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    YouTube,
    Vimeo,
    Dailymotion,
}

/// Host fragments that mark a URL as a video page. Matched as substrings of the
/// host so subdomains (`m.youtube.com`, `player.vimeo.com`) are accepted.
const VIDEO_DOMAINS: &[(&str, Platform)] = &[
    ("youtube.com", Platform::YouTube),
    ("youtu.be", Platform::YouTube),
    ("vimeo.com", Platform::Vimeo),
    ("dailymotion.com", Platform::Dailymotion),
];

impl Platform {
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = url::Url::parse(url).ok()?;
        Self::from_host(parsed.host_str()?)
    }

    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.to_ascii_lowercase();
        VIDEO_DOMAINS
            .iter()
            .find(|(domain, _)| host.contains(domain))
            .map(|(_, platform)| *platform)
    }

    /// Player URL suitable for an inline preview, when the platform has one we can
    /// build from the bare video id.
    pub fn embed_url(&self, video_id: &str) -> Option<String> {
        match self {
            Platform::YouTube => Some(format!("https://www.youtube.com/embed/{}", video_id)),
            Platform::Vimeo | Platform::Dailymotion => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::YouTube => write!(f, "youtube"),
            Platform::Vimeo => write!(f, "vimeo"),
            Platform::Dailymotion => write!(f, "dailymotion"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_platform_from_subdomain() {
        assert_eq!(
            Platform::from_url("https://m.youtube.com/watch?v=abc"),
            Some(Platform::YouTube)
        );
        assert_eq!(
            Platform::from_url("https://player.vimeo.com/video/1"),
            Some(Platform::Vimeo)
        );
    }

    #[test]
    fn ignores_domain_in_path_or_query() {
        assert_eq!(Platform::from_url("https://example.com/youtube.com"), None);
        assert_eq!(Platform::from_url("https://example.com/?u=youtu.be"), None);
    }

    #[test]
    fn host_match_is_case_insensitive() {
        assert_eq!(Platform::from_host("WWW.DailyMotion.com"), Some(Platform::Dailymotion));
    }

    #[test]
    fn embed_url_only_for_youtube() {
        assert_eq!(
            Platform::YouTube.embed_url("dQw4w9WgXcQ").as_deref(),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ")
        );
        assert_eq!(Platform::Vimeo.embed_url("1"), None);
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Platform::YouTube.to_string(), "youtube");
        assert_eq!(Platform::Dailymotion.to_string(), "dailymotion");
    }
}
