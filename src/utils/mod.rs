use url::Url;

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            match c {
                // Keep alphanumeric characters, spaces, hyphens, underscores, and dots
                c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' => c,
                // Replace everything else with underscore
                _ => '_',
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Pick a file extension from a media URL's path, falling back when the
/// path carries none (query strings and signed URLs are common).
pub fn file_extension_from_url(url: &str, fallback: &str) -> String {
    let from_path = Url::parse(url).ok().and_then(|parsed| {
        let path = parsed.path().to_string();
        let name = path.rsplit('/').next()?;
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() || ext.len() > 5 {
            return None;
        }
        Some(sanitize_filename(&ext.to_lowercase()))
    });

    from_path.unwrap_or_else(|| fallback.to_string())
}

/// Check if the current environment has required tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    // Check for ffprobe (required for frame sampling)
    if !check_command_available("ffprobe").await {
        missing.push("ffprobe - required for video analysis".to_string());
    }

    // Check for ffmpeg (required for frame sampling)
    if !check_command_available("ffmpeg").await {
        missing.push("ffmpeg - required for frame extraction".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("-version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m 1s");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Hello World!"), "Hello World_");
        assert_eq!(sanitize_filename("test/file?name"), "test_file_name");
        assert_eq!(sanitize_filename("  spaced  "), "spaced");
    }

    #[test]
    fn test_file_extension_from_url() {
        assert_eq!(
            file_extension_from_url("https://cdn.example.com/media/clip.mp4", "bin"),
            "mp4"
        );
        assert_eq!(
            file_extension_from_url("https://cdn.example.com/audio.m4a?sig=abc123", "bin"),
            "m4a"
        );
        assert_eq!(
            file_extension_from_url("https://cdn.example.com/stream", "mp4"),
            "mp4"
        );
        assert_eq!(file_extension_from_url("not a url", "m4a"), "m4a");
    }
}
