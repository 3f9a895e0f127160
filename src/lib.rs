//! tubegram - Interactive CLI for posting YouTube videos to a Telegram channel
//!
//! The pipeline is deliberately linear: validate the URL, list the available
//! formats, download the selected streams (remuxed into the chosen container),
//! upload the file to a channel with its thumbnail, and delete the local copy.
//! Media extraction and remuxing are delegated to yt-dlp and ffmpeg
//! subprocesses; Telegram transport goes through teloxide.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, validation, subprocess helpers
//! - `download`: yt-dlp probing and downloading, thumbnail preparation
//! - `telegram`: bot construction and the channel upload

pub mod cli;
pub mod core;
pub mod download;
pub mod interactive;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use crate::download::{cleanup, download_video, fetch_video_info, DownloadResult, VideoInfo};
pub use crate::telegram::{create_bot, upload_video};
