use unicode_normalization::UnicodeNormalization;

/// Makes a remote-supplied name safe as a single path component on every
/// desktop filesystem. Returns an empty string when nothing usable is left.
pub fn sanitize_path_component(name: &str) -> String {
    let name: String = name.nfc().filter(|c| !c.is_control()).collect();
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let name = name.replace(" | ", "｜");

    let forbidden: &[(char, char)] = &[
        ('<', '＜'),
        ('>', '＞'),
        (':', '꞉'),
        ('"', '＂'),
        ('/', '⧸'),
        ('\\', '＼'),
        ('|', '｜'),
        ('?', '？'),
        ('*', '＊'),
    ];

    let mut result = name;
    for (from, to) in forbidden {
        result = result.replace(*from, &to.to_string());
    }

    let result = result.trim().trim_end_matches(['.', ' ']);

    // Reserved device names (CON, NUL, COM1...) and overlong names.
    let options = sanitize_filename::Options {
        windows: true,
        truncate: true,
        replacement: "_",
    };
    sanitize_filename::sanitize_with_options(result, options)
}

/// Output filename for a directly downloaded image: the last path segment of
/// the URL, percent-decoded, or `image_{unix_ts}.jpg` when the URL has none.
pub fn image_filename(url: &str, unix_ts: i64) -> String {
    url_basename(url)
        .map(|name| sanitize_path_component(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback_image_filename(unix_ts))
}

pub fn fallback_image_filename(unix_ts: i64) -> String {
    format!("image_{}.jpg", unix_ts)
}

fn url_basename(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let base = parsed.path().rsplit('/').next()?;
    if base.is_empty() {
        return None;
    }
    // Segments that do not decode to UTF-8 keep their encoded form.
    match urlencoding::decode(base) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(base.to_string()),
    }
}
