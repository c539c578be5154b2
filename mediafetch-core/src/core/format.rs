pub fn format_duration(seconds: Option<u64>) -> String {
    let seconds = match seconds {
        Some(s) if s > 0 => s,
        _ => return "Unknown duration".to_string(),
    };

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

pub fn format_views(count: Option<u64>) -> String {
    let count = match count {
        Some(c) if c > 0 => c,
        _ => return "No views".to_string(),
    };

    if count < 1_000 {
        count.to_string()
    } else if count < 1_000_000 {
        format!("{:.1}K", count as f64 / 1e3)
    } else if count < 1_000_000_000 {
        format!("{:.1}M", count as f64 / 1e6)
    } else {
        format!("{:.1}B", count as f64 / 1e9)
    }
}
