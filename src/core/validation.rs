//! URL, format and filename validation utilities
//!
//! Provides security-focused validation for user inputs:
//! - YouTube URL validation (whitelist-based)
//! - Format selection validation against the probed format tables
//! - Filename sanitization (remove filesystem-unsafe characters)

use lazy_regex::regex_captures;
use thiserror::Error;
use url::Url;

/// Validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Invalid URL format or non-YouTube domain
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    /// Format id not present in the probed format list
    #[error("Unknown format id: {0}")]
    UnknownFormat(String),
}

/// Validates that a URL is a valid YouTube URL.
///
/// # Security
/// Uses whitelist approach:
/// - Only HTTP/HTTPS schemes allowed
/// - Only youtube.com, youtu.be, youtube-nocookie.com domains (+ subdomains)
///
/// # Examples
/// ```
/// use tubegram::core::validation::validate_youtube_url;
///
/// assert!(validate_youtube_url("https://youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
/// assert!(validate_youtube_url("https://youtu.be/dQw4w9WgXcQ").is_ok());
/// assert!(validate_youtube_url("https://evil.com/watch?v=dQw4w9WgXcQ").is_err());
/// assert!(validate_youtube_url("not a url").is_err());
/// ```
pub fn validate_youtube_url(url: &str) -> Result<Url, ValidationError> {
    let parsed = Url::parse(url).map_err(|_| ValidationError::InvalidUrl(url.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::InvalidUrl(format!(
            "{} (invalid scheme: {})",
            url,
            parsed.scheme()
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| ValidationError::InvalidUrl(format!("{} (no host)", url)))?;

    let is_youtube = host == "youtube.com"
        || host.ends_with(".youtube.com")
        || host == "youtu.be"
        || host.ends_with(".youtube-nocookie.com");

    if !is_youtube {
        return Err(ValidationError::InvalidUrl(format!(
            "{} (not a YouTube domain: {})",
            url, host
        )));
    }

    Ok(parsed)
}

/// Extracts the 11-character video id from a YouTube URL, if present.
///
/// Used as a filename fallback when the video title sanitizes to nothing.
pub fn extract_video_id(url: &str) -> Option<&str> {
    regex_captures!(r"(?:v=|youtu\.be/|/shorts/|/embed/)([A-Za-z0-9_-]{11})", url).map(|(_, id)| id)
}

/// Validates that a user-selected format id exists in the probed format table.
///
/// The table is an ordered list of `(format_id, display_label)` pairs, in the
/// order yt-dlp reported them (worst to best quality).
pub fn validate_format_selection(
    available_formats: &[(String, String)],
    selected_format: &str,
) -> Result<(), ValidationError> {
    if available_formats.iter().any(|(id, _)| id == selected_format) {
        Ok(())
    } else {
        Err(ValidationError::UnknownFormat(selected_format.to_string()))
    }
}

/// Sanitizes a filename by removing filesystem-unsafe characters.
///
/// # Security
/// Removes characters that could cause issues on various filesystems:
/// - Path separators: `/`, `\`
/// - Reserved characters: `:`, `*`, `?`, `"`, `<`, `>`, `|`
/// - Control characters (ASCII 0-31, 127)
///
/// # Examples
/// ```
/// use tubegram::core::validation::sanitize_filename;
///
/// assert_eq!(sanitize_filename("video.mp4"), "video.mp4");
/// assert_eq!(sanitize_filename("video:file.mp4"), "videofile.mp4");
/// assert_eq!(sanitize_filename("path/to/file.mp4"), "pathtofile.mp4");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !['/', '\\', ':', '*', '?', '"', '<', '>', '|'].contains(c))
        .filter(|c| !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_youtube_url_valid() {
        let valid_urls = vec![
            "https://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "http://youtube.com/watch?v=dQw4w9WgXcQ", // http ok
            "https://music.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
        ];

        for url in valid_urls {
            assert!(validate_youtube_url(url).is_ok(), "should accept {}", url);
        }
    }

    #[test]
    fn test_validate_youtube_url_invalid() {
        let invalid_urls = vec![
            "https://evil.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com.evil.com/watch?v=x",
            "ftp://youtube.com/video",
            "not a url",
            "",
            "javascript:alert(1)",
        ];

        for url in invalid_urls {
            assert!(validate_youtube_url(url).is_err(), "should reject {}", url);
        }
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
        assert_eq!(extract_video_id("https://youtube.com/"), None);
    }

    #[test]
    fn test_validate_format_selection() {
        let formats = vec![("137".to_string(), "1080p (mp4, 120.0MB)".to_string())];

        assert!(validate_format_selection(&formats, "137").is_ok());
        assert!(validate_format_selection(&formats, "138").is_err());
        assert!(validate_format_selection(&formats, "").is_err());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("video.mp4"), "video.mp4");
        assert_eq!(sanitize_filename("video:file.mp4"), "videofile.mp4");
        assert_eq!(sanitize_filename("path/to/file.mp4"), "pathtofile.mp4");
        assert_eq!(sanitize_filename("file*?.mp4"), "file.mp4");
        assert_eq!(sanitize_filename("tab\there"), "tabhere");
    }
}
