//! Video download step: drives yt-dlp, locates the merged output and the
//! written thumbnail, and cleans every artifact up afterwards.

use crate::core::config;
use crate::core::error::AppError;
use crate::core::process::{run_with_timeout, FFPROBE_TIMEOUT};
use crate::core::validation::{extract_video_id, sanitize_filename};
use crate::download::formats::VideoInfo;
use crate::download::ytdlp::add_cookies_args;
use fs_err as fs;
use std::path::{Path, PathBuf};
use tokio::process::Command as TokioCommand;
use url::Url;

/// Extensions yt-dlp may write the thumbnail with (`--write-thumbnail`).
const THUMBNAIL_EXTS: &[&str] = &["webp", "jpg", "png"];

/// Result of a completed download.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// Path to the merged video file
    pub video_path: PathBuf,
    /// Path to the thumbnail written by yt-dlp, if any
    pub thumbnail_path: Option<PathBuf>,
    /// Video title (caption for the upload)
    pub title: String,
    /// Duration in seconds, from the metadata probe
    pub duration: u32,
}

/// Picks a filesystem-safe base name for the download.
///
/// Prefers the sanitized title; falls back to the video id, then a constant.
fn file_base_name(title: &str, url: &Url) -> String {
    let sanitized = sanitize_filename(title);
    let trimmed = sanitized.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    extract_video_id(url.as_str()).unwrap_or("video").to_string()
}

/// Downloads a video with the selected formats and container.
///
/// Runs yt-dlp with `-f <video>[+<audio>]`, writes the thumbnail next to the
/// video, and remuxes into `container` (`--merge-output-format`). An invalid
/// container falls back to mp4 with a warning, matching the menu default.
pub async fn download_video(
    url: &Url,
    video_format: &str,
    audio_format: Option<&str>,
    container: &str,
    info: &VideoInfo,
) -> Result<DownloadResult, AppError> {
    if video_format.trim().is_empty() {
        return Err(AppError::Validation("Video format ID cannot be empty".to_string()));
    }

    let container = if config::VALID_CONTAINERS.contains(&container) {
        container
    } else {
        log::warn!("Invalid container format: {}. Using mp4 instead.", container);
        "mp4"
    };

    let format_arg = match audio_format {
        Some(audio) if !audio.trim().is_empty() => format!("{}+{}", video_format, audio),
        _ => video_format.to_string(),
    };

    let folder = config::download_folder();
    fs::create_dir_all(&folder)?;

    let base_name = file_base_name(&info.title, url);
    let base_path = Path::new(&folder).join(&base_name);
    // A literal % in the title would be parsed as an output-template field
    let output_template = format!("{}.%(ext)s", base_path.display().to_string().replace('%', "%%"));

    let mut args: Vec<String> = vec![
        "-f".to_string(),
        format_arg,
        "-o".to_string(),
        output_template,
        "--no-playlist".to_string(),
        "--write-thumbnail".to_string(),
        "--force-overwrites".to_string(),
        "--merge-output-format".to_string(),
        container.to_string(),
        "--socket-timeout".to_string(),
        "30".to_string(),
    ];
    add_cookies_args(&mut args);
    args.push(url.to_string());

    log::info!("Downloading {} as {} into {}", url, container, folder);

    let ytdl_bin = &*config::YTDL_BIN;
    let mut cmd = TokioCommand::new(ytdl_bin);
    cmd.args(&args);
    let output = run_with_timeout(&mut cmd, config::download::download_timeout()).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Download(format!(
            "Failed to download video: {}",
            stderr.trim()
        )));
    }

    // The merged file carries the requested container extension. Built by
    // string concatenation: with_extension() would eat anything after a dot
    // in the title.
    let video_path = PathBuf::from(format!("{}.{}", base_path.display(), container));
    if !video_path.exists() {
        return Err(AppError::Download(format!(
            "Downloaded video file not found: {}",
            video_path.display()
        )));
    }

    let thumbnail_path = find_thumbnail(&base_path);
    if thumbnail_path.is_none() {
        log::warn!("yt-dlp did not write a thumbnail for {}", url);
    }

    Ok(DownloadResult {
        video_path,
        thumbnail_path,
        title: info.title.clone(),
        duration: info.duration,
    })
}

/// Locates the thumbnail yt-dlp wrote next to the video, if any.
fn find_thumbnail(base_path: &Path) -> Option<PathBuf> {
    THUMBNAIL_EXTS
        .iter()
        .map(|ext| PathBuf::from(format!("{}.{}", base_path.display(), ext)))
        .find(|p| p.exists())
}

/// Probes duration, width and height of a local video file via ffprobe.
///
/// Telegram needs these to render the player correctly; absence of any value
/// is tolerated (the upload falls back to the yt-dlp metadata).
pub async fn probe_video_metadata(path: &Path) -> Option<(u32, Option<u32>, Option<u32>)> {
    let mut cmd = TokioCommand::new("ffprobe");
    cmd.args([
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        "stream=width,height:format=duration",
        "-of",
        "default=noprint_wrappers=1",
    ])
    .arg(path);

    let output = run_with_timeout(&mut cmd, FFPROBE_TIMEOUT).await.ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut duration = None;
    let mut width = None;
    let mut height = None;

    for line in stdout.lines() {
        match line.trim().split_once('=') {
            Some(("duration", v)) => duration = v.parse::<f64>().ok().map(|d| d.round() as u32),
            Some(("width", v)) => width = v.parse::<u32>().ok(),
            Some(("height", v)) => height = v.parse::<u32>().ok(),
            _ => {}
        }
    }

    duration.map(|d| (d, width, height))
}

/// Deletes the downloaded video, the prepared thumbnail, and any leftover
/// thumbnail originals written before conversion.
///
/// Deletion failures are logged and swallowed; cleanup must never mask the
/// pipeline's own result.
pub fn cleanup(result: &DownloadResult) {
    remove_if_exists(&result.video_path);

    if let Some(ref thumb) = result.thumbnail_path {
        remove_if_exists(thumb);
    }

    for ext in ["webp", "jpg", "jpeg", "png"] {
        let leftover = result.video_path.with_extension(ext);
        remove_if_exists(&leftover);
    }

    // Compressed thumbnail produced when the original was over 200 KB
    if let Some(stem) = result.video_path.file_stem() {
        let compressed = result
            .video_path
            .with_file_name(format!("{}_thumb.jpg", stem.to_string_lossy()));
        remove_if_exists(&compressed);
    }
}

fn remove_if_exists(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            log::error!("Cleanup error for {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_url() -> Url {
        Url::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap()
    }

    #[test]
    fn test_file_base_name_from_title() {
        assert_eq!(file_base_name("My Video: Part 1", &test_url()), "My Video Part 1");
    }

    #[test]
    fn test_file_base_name_falls_back_to_video_id() {
        assert_eq!(file_base_name("///???", &test_url()), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_find_thumbnail_prefers_webp() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("clip");
        std::fs::File::create(base.with_extension("webp")).unwrap();
        std::fs::File::create(base.with_extension("jpg")).unwrap();

        let found = find_thumbnail(&base).unwrap();
        assert_eq!(found.extension().unwrap(), "webp");
    }

    #[test]
    fn test_find_thumbnail_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_thumbnail(&dir.path().join("clip")).is_none());
    }

    #[test]
    fn test_cleanup_removes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        let thumb = dir.path().join("clip.jpg");
        let original = dir.path().join("clip.webp");

        for path in [&video, &thumb, &original] {
            let mut f = std::fs::File::create(path).unwrap();
            f.write_all(b"data").unwrap();
        }

        let result = DownloadResult {
            video_path: video.clone(),
            thumbnail_path: Some(thumb.clone()),
            title: "clip".to_string(),
            duration: 10,
        };

        cleanup(&result);

        assert!(!video.exists());
        assert!(!thumb.exists());
        assert!(!original.exists());
    }

    #[test]
    fn test_cleanup_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let result = DownloadResult {
            video_path: dir.path().join("ghost.mp4"),
            thumbnail_path: None,
            title: "ghost".to_string(),
            duration: 0,
        };

        // Must not panic
        cleanup(&result);
    }
}
