//! Thumbnail preparation for Telegram uploads.
//!
//! Telegram accepts JPEG/PNG thumbnails up to 200 KB with a 320 px bound.
//! yt-dlp usually writes WebP, so this module:
//! - Detects the image format from magic bytes (JPEG, PNG, WebP)
//! - Converts WebP (or unknown formats) to JPEG using ffmpeg
//! - Recompresses oversized JPEGs down to the Telegram limit

use crate::core::config::limits::THUMB_MAX_BYTES;
use crate::core::error::AppError;
use crate::core::process::{run_with_timeout, FFMPEG_TIMEOUT};
use fs_err as fs;
use std::path::{Path, PathBuf};
use tokio::process::Command as TokioCommand;

/// Image format detected by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Unknown,
}

/// Detects image format from the first bytes of a file (magic bytes)
///
/// # Arguments
///
/// * `bytes` - The first bytes of the image file (at least 12 bytes recommended)
pub(crate) fn detect_image_format(bytes: &[u8]) -> ImageFormat {
    if bytes.len() < 4 {
        return ImageFormat::Unknown;
    }

    // JPEG: FF D8 FF
    if bytes.len() >= 3 && bytes[0] == 0xFF && bytes[1] == 0xD8 && bytes[2] == 0xFF {
        return ImageFormat::Jpeg;
    }

    // PNG: 89 50 4E 47
    if bytes[0] == 0x89 && bytes[1] == 0x50 && bytes[2] == 0x4E && bytes[3] == 0x47 {
        return ImageFormat::Png;
    }

    // WebP: RIFF...WEBP
    if bytes.len() >= 12
        && bytes[0] == 0x52
        && bytes[1] == 0x49
        && bytes[2] == 0x46
        && bytes[3] == 0x46
        && bytes[8] == 0x57
        && bytes[9] == 0x45
        && bytes[10] == 0x42
        && bytes[11] == 0x50
    {
        return ImageFormat::WebP;
    }

    ImageFormat::Unknown
}

/// Converts an image to JPEG using ffmpeg.
async fn convert_to_jpeg(input: &Path, output: &Path) -> Result<(), AppError> {
    let mut cmd = TokioCommand::new("ffmpeg");
    cmd.arg("-i")
        .arg(input)
        .args(["-q:v", "2", "-y"]) // High quality, overwrite output
        .arg(output);

    let result = run_with_timeout(&mut cmd, FFMPEG_TIMEOUT).await?;
    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(AppError::Download(format!("ffmpeg conversion failed: {}", stderr.trim())));
    }
    Ok(())
}

/// Scales and recompresses a JPEG to fit Telegram's thumbnail limits.
async fn compress_jpeg(input: &Path, output: &Path) -> Result<(), AppError> {
    let mut cmd = TokioCommand::new("ffmpeg");
    cmd.arg("-i")
        .arg(input)
        .args([
            "-vf",
            "scale=320:320:force_original_aspect_ratio=decrease",
            "-q:v",
            "5", // Medium quality for size reduction
            "-y",
        ])
        .arg(output);

    let result = run_with_timeout(&mut cmd, FFMPEG_TIMEOUT).await?;
    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(AppError::Download(format!("ffmpeg compression failed: {}", stderr.trim())));
    }
    Ok(())
}

/// Prepares a thumbnail file for Telegram.
///
/// Returns the path to a JPEG/PNG within the size limit, or `None` when the
/// thumbnail cannot be prepared. The upload proceeds without a thumbnail in
/// that case; this step is never fatal.
pub async fn prepare_thumbnail(input: &Path) -> Option<PathBuf> {
    if !input.exists() {
        return None;
    }

    let bytes = match fs::read(input) {
        Ok(b) => b,
        Err(e) => {
            log::warn!("Failed to read thumbnail {}: {}", input.display(), e);
            return None;
        }
    };

    let format = detect_image_format(&bytes);
    log::info!(
        "Thumbnail {}: {:?}, {} KB",
        input.display(),
        format,
        bytes.len() / 1024
    );

    let jpeg_path = match format {
        ImageFormat::Jpeg | ImageFormat::Png => input.to_path_buf(),
        ImageFormat::WebP | ImageFormat::Unknown => {
            let converted = input.with_extension("jpg");
            match convert_to_jpeg(input, &converted).await {
                Ok(()) => converted,
                Err(e) => {
                    log::warn!("Thumbnail conversion failed: {}", e);
                    return None;
                }
            }
        }
    };

    let size = fs::metadata(&jpeg_path).map(|m| m.len() as usize).unwrap_or(0);
    if size <= THUMB_MAX_BYTES {
        return Some(jpeg_path);
    }

    // Over the 200 KB limit: scale down to 320px and recompress
    let compressed = jpeg_path.with_file_name(format!(
        "{}_thumb.jpg",
        jpeg_path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_else(|| "thumb".to_string())
    ));
    match compress_jpeg(&jpeg_path, &compressed).await {
        Ok(()) => {
            let compressed_size = fs::metadata(&compressed).map(|m| m.len() as usize).unwrap_or(usize::MAX);
            if compressed_size <= THUMB_MAX_BYTES {
                Some(compressed)
            } else {
                log::warn!(
                    "Thumbnail still {} KB after compression, sending without thumbnail",
                    compressed_size / 1024
                );
                let _ = fs::remove_file(&compressed);
                None
            }
        }
        Err(e) => {
            log::warn!("Thumbnail compression failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_jpeg() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(detect_image_format(&bytes), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_png() {
        let bytes = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_image_format(&bytes), ImageFormat::Png);
    }

    #[test]
    fn test_detect_webp() {
        let bytes = [0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50];
        assert_eq!(detect_image_format(&bytes), ImageFormat::WebP);
    }

    #[test]
    fn test_detect_unknown_and_short() {
        assert_eq!(detect_image_format(&[0x00, 0x01, 0x02, 0x03]), ImageFormat::Unknown);
        assert_eq!(detect_image_format(&[0xFF]), ImageFormat::Unknown);
        assert_eq!(detect_image_format(&[]), ImageFormat::Unknown);
    }

    #[tokio::test]
    async fn test_prepare_thumbnail_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(prepare_thumbnail(&dir.path().join("nope.webp")).await.is_none());
    }

    #[tokio::test]
    async fn test_prepare_thumbnail_small_jpeg_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumb.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();

        let prepared = prepare_thumbnail(&path).await.unwrap();
        assert_eq!(prepared, path);
    }
}
