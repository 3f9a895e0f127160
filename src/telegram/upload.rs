//! Sending downloaded videos to the target channel.
//!
//! Wraps `send_video` with:
//! - Size limit checking before any bytes leave the machine
//! - ffprobe metadata (duration/width/height) so Telegram renders the player
//! - Thumbnail attachment (local file, or remote URL as a fallback)
//! - Retry with exponential backoff and flood-wait handling
//! - A one-shot `send_document` fallback when Telegram refuses the stream

use crate::core::config;
use crate::core::error::AppError;
use crate::core::retry::{retry_async, RetryConfig};
use crate::download::thumbnail::detect_image_format;
use crate::download::thumbnail::ImageFormat;
use crate::download::video::probe_video_metadata;
use crate::download::DownloadResult;
use crate::telegram::Bot;
use std::fs;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::InputFile;

/// Thumbnail payload resolved before the retry loop.
#[derive(Clone)]
enum ThumbSource {
    File(std::path::PathBuf),
    Memory(Vec<u8>),
}

impl ThumbSource {
    fn into_input_file(self) -> InputFile {
        match self {
            ThumbSource::File(path) => InputFile::file(path),
            ThumbSource::Memory(bytes) => InputFile::memory(bytes),
        }
    }
}

/// Downloads a remote thumbnail and keeps it only if Telegram will accept it.
async fn fetch_thumbnail_bytes(url: &str) -> Option<Vec<u8>> {
    let response = match reqwest::get(url).await {
        Ok(r) => r,
        Err(e) => {
            log::warn!("Failed to download thumbnail from {}: {}", url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        log::warn!("Thumbnail request failed with status: {}", response.status());
        return None;
    }

    let bytes = match response.bytes().await {
        Ok(b) => b.to_vec(),
        Err(e) => {
            log::warn!("Failed to read thumbnail bytes: {}", e);
            return None;
        }
    };

    match detect_image_format(&bytes) {
        ImageFormat::Jpeg | ImageFormat::Png => {
            if bytes.len() > config::limits::THUMB_MAX_BYTES {
                log::warn!(
                    "Remote thumbnail is {} KB, over Telegram's 200 KB limit; skipping",
                    bytes.len() / 1024
                );
                None
            } else {
                Some(bytes)
            }
        }
        other => {
            log::warn!("Remote thumbnail has unsupported format {:?}; skipping", other);
            None
        }
    }
}

/// True for errors where a document fallback would risk a duplicate post:
/// the request may have gone through even though the response never arrived.
fn is_timeout_or_network_error(err: &AppError) -> bool {
    let text = err.to_string().to_lowercase();
    text.contains("timed out") || text.contains("timeout") || text.contains("connection")
}

/// Uploads a downloaded video to the channel.
///
/// `thumbnail` is the locally prepared JPEG/PNG; `thumbnail_url` is used as a
/// fallback when no local thumbnail survived preparation.
pub async fn upload_video(
    bot: &Bot,
    chat_id: ChatId,
    result: &DownloadResult,
    thumbnail: Option<&Path>,
    thumbnail_url: Option<&str>,
) -> Result<Message, AppError> {
    if !result.video_path.exists() {
        return Err(AppError::Download(format!(
            "Video file not found: {}",
            result.video_path.display()
        )));
    }

    let file_size = fs::metadata(&result.video_path)?.len();
    let max_size = config::limits::max_video_size_bytes();
    if file_size > max_size {
        return Err(AppError::Validation(format!(
            "File size ({:.2} MB) exceeds the Telegram upload limit ({:.0} MB). \
             Pick a smaller format, or run a local Bot API server (BOT_API_URL).",
            file_size as f64 / (1024.0 * 1024.0),
            max_size as f64 / (1024.0 * 1024.0)
        )));
    }

    // Probe the real file; fall back to the yt-dlp metadata when ffprobe
    // is unavailable.
    let probed = probe_video_metadata(&result.video_path).await;
    let duration = probed.map(|(d, _, _)| d).unwrap_or(result.duration);
    let width = probed.and_then(|(_, w, _)| w);
    let height = probed.and_then(|(_, _, h)| h);

    log::info!(
        "Uploading {} ({:.2} MB, {}s) to chat {}",
        result.video_path.display(),
        file_size as f64 / (1024.0 * 1024.0),
        duration,
        chat_id
    );

    let thumb_source = match thumbnail {
        Some(path) if path.exists() => Some(ThumbSource::File(path.to_path_buf())),
        _ => match thumbnail_url {
            Some(url) => fetch_thumbnail_bytes(url).await.map(ThumbSource::Memory),
            None => None,
        },
    };

    let retry_config = RetryConfig::default().initial_delay(config::retry::delay());
    let video_path = result.video_path.clone();
    let title = result.title.clone();

    let send_result: Result<Message, AppError> = retry_async(&retry_config, "send_video", || {
        let video_path = video_path.clone();
        let title = title.clone();
        let thumb_source = thumb_source.clone();
        async move {
            let mut request = bot
                .send_video(chat_id, InputFile::file(video_path))
                .caption(title)
                .duration(duration)
                .supports_streaming(true);

            if let Some(w) = width {
                request = request.width(w);
            }
            if let Some(h) = height {
                request = request.height(h);
            }
            if let Some(thumb) = thumb_source {
                request = request.thumbnail(thumb.into_input_file());
            }

            request.await.map_err(AppError::from)
        }
    })
    .await;

    match send_result {
        Ok(message) => Ok(message),
        Err(err) if is_timeout_or_network_error(&err) => {
            // The video may already be posted; a document fallback here
            // would duplicate it.
            log::warn!("send_video failed with a timeout/network error; skipping send_document fallback");
            Err(err)
        }
        Err(err) => {
            log::warn!("send_video failed ({}), trying send_document as fallback", err);

            let mut request = bot
                .send_document(chat_id, InputFile::file(result.video_path.clone()))
                .caption(result.title.clone());
            if let Some(thumb) = thumb_source {
                request = request.thumbnail(thumb.into_input_file());
            }

            request.await.map_err(AppError::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_timeout_or_network_error() {
        assert!(is_timeout_or_network_error(&AppError::Download(
            "request timed out".to_string()
        )));
        assert!(is_timeout_or_network_error(&AppError::Download(
            "connection reset by peer".to_string()
        )));
        assert!(!is_timeout_or_network_error(&AppError::Download(
            "file is too big".to_string()
        )));
    }

    #[tokio::test]
    async fn test_upload_missing_file_errors_before_any_request() {
        let bot = Bot::new("000000:TEST_TOKEN");
        let result = DownloadResult {
            video_path: std::path::PathBuf::from("/nonexistent/video.mp4"),
            thumbnail_path: None,
            title: "missing".to_string(),
            duration: 0,
        };

        let err = upload_video(&bot, ChatId(-1), &result, None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Download(_)));
    }
}
