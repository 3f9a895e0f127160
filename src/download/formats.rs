//! Video metadata and format-list probing via `yt-dlp --dump-json`.
//!
//! yt-dlp prints one JSON object describing the video, including every
//! downloadable format. Formats carrying a video codec go into the video
//! table; audio-only formats (audio codec present, video codec "none") go
//! into the audio table. Tables preserve yt-dlp's order (worst to best).

use crate::core::config;
use crate::core::error::AppError;
use crate::core::process::run_with_timeout;
use crate::download::ytdlp::add_cookies_args;
use serde::Deserialize;
use tokio::process::Command as TokioCommand;
use url::Url;

/// One format entry from the yt-dlp JSON `formats` array.
#[derive(Debug, Clone, Deserialize)]
pub struct YtdlpFormat {
    pub format_id: String,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<u64>,
    #[serde(default)]
    pub abr: Option<f64>,
}

/// Top-level yt-dlp video JSON (only the fields we read).
#[derive(Debug, Deserialize)]
struct YtdlpVideoJson {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    formats: Vec<YtdlpFormat>,
}

/// Ordered `(format_id, display_label)` pairs.
pub type FormatTable = Vec<(String, String)>;

/// Probed video metadata with selectable format tables.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub video_formats: FormatTable,
    pub audio_formats: FormatTable,
    pub title: String,
    pub duration: u32,
    pub thumbnail: Option<String>,
}

impl YtdlpFormat {
    fn has_video(&self) -> bool {
        self.vcodec.as_deref().map(|v| v != "none").unwrap_or(false)
    }

    fn is_audio_only(&self) -> bool {
        self.acodec.as_deref().map(|a| a != "none").unwrap_or(false) && !self.has_video()
    }

    /// Display label for a video format: `1080p@30fps (mp4, 123.4MB)`
    fn video_label(&self) -> String {
        let resolution = self.height.unwrap_or(0);
        let fps_part = match self.fps {
            Some(fps) if fps > 0.0 => format!("@{:.0}fps", fps),
            _ => String::new(),
        };
        let ext = self.ext.as_deref().unwrap_or("unknown");
        let size_mb = self
            .filesize
            .or(self.filesize_approx)
            .map(|s| s as f64 / (1024.0 * 1024.0))
            .unwrap_or(0.0);
        format!("{}p{} ({}, {:.1}MB)", resolution, fps_part, ext, size_mb)
    }

    /// Display label for an audio format: `128kbps (m4a)`
    fn audio_label(&self) -> String {
        let ext = self.ext.as_deref().unwrap_or("unknown");
        format!("{:.0}kbps ({})", self.abr.unwrap_or(0.0), ext)
    }
}

/// Splits a yt-dlp format array into display tables.
fn build_format_tables(formats: &[YtdlpFormat]) -> (FormatTable, FormatTable) {
    let mut video_formats = Vec::new();
    let mut audio_formats = Vec::new();

    for fmt in formats {
        if fmt.has_video() {
            video_formats.push((fmt.format_id.clone(), fmt.video_label()));
        } else if fmt.is_audio_only() {
            audio_formats.push((fmt.format_id.clone(), fmt.audio_label()));
        }
    }

    (video_formats, audio_formats)
}

/// Fetches available formats and metadata for a video without downloading it.
///
/// Runs `yt-dlp --dump-json --no-playlist <url>` and parses the single JSON
/// object it prints.
pub async fn fetch_video_info(url: &Url) -> Result<VideoInfo, AppError> {
    let ytdl_bin = &*config::YTDL_BIN;

    let mut args: Vec<String> = vec![
        "--dump-json".to_string(),
        "--no-playlist".to_string(),
        "--socket-timeout".to_string(),
        "30".to_string(),
    ];
    add_cookies_args(&mut args);
    args.push(url.to_string());

    log::info!("Probing formats for {}", url);

    let mut cmd = TokioCommand::new(ytdl_bin);
    cmd.args(&args);
    let output = run_with_timeout(&mut cmd, config::download::probe_timeout()).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Download(format!(
            "Failed to extract video info: {}",
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| AppError::Download("yt-dlp produced no metadata output".to_string()))?;

    let json: YtdlpVideoJson =
        serde_json::from_str(line).map_err(|e| AppError::Download(format!("Failed to parse yt-dlp JSON: {}", e)))?;

    let (video_formats, audio_formats) = build_format_tables(&json.formats);

    Ok(VideoInfo {
        video_formats,
        audio_formats,
        title: json.title.unwrap_or_else(|| "Unknown Title".to_string()),
        duration: json.duration.unwrap_or(0.0).round() as u32,
        thumbnail: json.thumbnail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fmt(id: &str, vcodec: Option<&str>, acodec: Option<&str>) -> YtdlpFormat {
        YtdlpFormat {
            format_id: id.to_string(),
            vcodec: vcodec.map(String::from),
            acodec: acodec.map(String::from),
            height: None,
            fps: None,
            ext: Some("mp4".to_string()),
            filesize: None,
            filesize_approx: None,
            abr: None,
        }
    }

    #[test]
    fn test_build_format_tables_splits_video_and_audio() {
        let formats = vec![
            fmt("137", Some("avc1"), Some("none")),
            fmt("140", Some("none"), Some("mp4a")),
            fmt("sb0", Some("none"), Some("none")), // storyboard, neither table
        ];

        let (video, audio) = build_format_tables(&formats);
        assert_eq!(video.len(), 1);
        assert_eq!(video[0].0, "137");
        assert_eq!(audio.len(), 1);
        assert_eq!(audio[0].0, "140");
    }

    #[test]
    fn test_video_label_full() {
        let mut f = fmt("137", Some("avc1"), Some("none"));
        f.height = Some(1080);
        f.fps = Some(30.0);
        f.filesize = Some(129_394_278); // ~123.4 MB
        assert_eq!(f.video_label(), "1080p@30fps (mp4, 123.4MB)");
    }

    #[test]
    fn test_video_label_missing_fields() {
        let f = fmt("18", Some("avc1"), Some("mp4a"));
        assert_eq!(f.video_label(), "0p (mp4, 0.0MB)");
    }

    #[test]
    fn test_audio_label() {
        let mut f = fmt("140", Some("none"), Some("mp4a"));
        f.ext = Some("m4a".to_string());
        f.abr = Some(129.478);
        assert_eq!(f.audio_label(), "129kbps (m4a)");
    }

    #[test]
    fn test_parse_ytdlp_json() {
        let json = r#"{
            "title": "Test Video",
            "duration": 212.5,
            "thumbnail": "https://i.ytimg.com/vi/x/maxresdefault.webp",
            "formats": [
                {"format_id": "140", "vcodec": "none", "acodec": "mp4a.40.2", "ext": "m4a", "abr": 129.5},
                {"format_id": "137", "vcodec": "avc1.640028", "acodec": "none", "ext": "mp4", "height": 1080, "fps": 24, "filesize": 1048576}
            ]
        }"#;

        let parsed: YtdlpVideoJson = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Test Video"));

        let (video, audio) = build_format_tables(&parsed.formats);
        assert_eq!(video, vec![("137".to_string(), "1080p@24fps (mp4, 1.0MB)".to_string())]);
        assert_eq!(audio, vec![("140".to_string(), "130kbps (m4a)".to_string())]);
    }
}
