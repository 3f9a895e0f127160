use indoc::indoc;
use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants and environment-driven settings

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Path to cookies file for YouTube authentication
/// Read from YTDL_COOKIES_FILE environment variable
/// Example: youtube_cookies.txt
pub static YTDL_COOKIES_FILE: Lazy<Option<String>> = Lazy::new(|| env::var("YTDL_COOKIES_FILE").ok());

/// Download folder path
/// Read from DOWNLOAD_FOLDER environment variable, defaults to the current
/// directory (the original tool downloaded next to the script).
/// Supports tilde (~) expansion for home directory.
pub static DOWNLOAD_FOLDER: Lazy<String> = Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| ".".to_string()));

/// Log file path for the combined console + file logger
pub static LOG_FILE_PATH: Lazy<String> = Lazy::new(|| env::var("LOG_FILE").unwrap_or_else(|_| "tubegram.log".to_string()));

/// Environment variables that must be present before the pipeline starts
pub const REQUIRED_ENV_VARS: &[&str] = &["TELEGRAM_BOT_TOKEN", "TELEGRAM_CHANNEL_ID"];

/// Returns the names of required environment variables that are missing or empty
pub fn missing_env_vars() -> Vec<&'static str> {
    REQUIRED_ENV_VARS
        .iter()
        .filter(|var| env::var(var).map(|v| v.trim().is_empty()).unwrap_or(true))
        .copied()
        .collect()
}

/// Telegram bot token from TELEGRAM_BOT_TOKEN
pub fn bot_token() -> Option<String> {
    env::var("TELEGRAM_BOT_TOKEN").ok().filter(|t| !t.trim().is_empty())
}

/// Target channel from TELEGRAM_CHANNEL_ID (numeric, e.g. -100XXXXXXXXXX)
pub fn channel_id() -> Option<i64> {
    env::var("TELEGRAM_CHANNEL_ID").ok().and_then(|v| v.trim().parse().ok())
}

/// Returns the expanded download folder path
pub fn download_folder() -> String {
    shellexpand::tilde(DOWNLOAD_FOLDER.as_str()).to_string()
}

/// Instructions printed when required environment variables are missing
pub fn setup_instructions() -> &'static str {
    indoc! {"
        Create a .env file in the working directory with the following content:

        TELEGRAM_BOT_TOKEN=your_bot_token
        TELEGRAM_CHANNEL_ID=-100XXXXXXXXXX # Your channel ID (numeric, no quotes)

        Get a bot token from @BotFather and add the bot to your channel as an
        administrator with the 'Post messages' permission.

        Optional variables:

        YTDL_BIN=yt-dlp                  # custom yt-dlp binary path
        YTDL_COOKIES_FILE=cookies.txt    # Netscape-format cookies for age-gated videos
        DOWNLOAD_FOLDER=~/downloads      # where temporary files are stored
        BOT_API_URL=http://localhost:8081 # local Bot API server (lifts the 50 MB limit)
    "}
}

/// Download configuration
pub mod download {
    use super::Duration;

    /// Timeout for yt-dlp metadata probes (in seconds)
    pub const PROBE_TIMEOUT_SECS: u64 = 60;

    /// Timeout for the full yt-dlp download (in seconds)
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 3600; // 1 hour

    /// Metadata probe timeout duration
    pub fn probe_timeout() -> Duration {
        Duration::from_secs(PROBE_TIMEOUT_SECS)
    }

    /// Full download timeout duration
    pub fn download_timeout() -> Duration {
        Duration::from_secs(DOWNLOAD_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for HTTP requests (in seconds)
    /// Increased to 15 minutes for large file uploads (especially videos via local Bot API)
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of retry attempts for sending files
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Initial delay between retry attempts (in seconds)
    pub const RETRY_DELAY_SECS: u64 = 10;

    /// Retry delay duration
    pub fn delay() -> Duration {
        Duration::from_secs(RETRY_DELAY_SECS)
    }
}

/// Telegram upload limits
pub mod limits {
    /// Maximum thumbnail size accepted by Telegram (200 KB)
    pub const THUMB_MAX_BYTES: usize = 200 * 1024;

    /// Maximum file size for video files
    ///
    /// Standard Telegram Bot API (api.telegram.org): 50 MB
    /// Local Bot API Server: up to 2 GB (see https://core.telegram.org/bots/api#using-a-local-bot-api-server)
    ///
    /// Check if local Bot API server is used via BOT_API_URL environment variable.
    /// If BOT_API_URL is set and not pointing to api.telegram.org, assume local server is used.
    pub fn max_video_size_bytes() -> u64 {
        if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
            if !bot_api_url.contains("api.telegram.org") {
                log::info!("Local Bot API server detected (BOT_API_URL={}), using 2 GB limit", bot_api_url);
                return 2 * 1024 * 1024 * 1024; // 2 GB for local server
            }
        }

        50 * 1024 * 1024 // 50 MB for the standard API
    }
}

/// Container formats the remux menu offers, in menu order. mp4 is the default.
pub const VALID_CONTAINERS: &[&str] = &["mp4", "mkv", "webm"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_containers_default_first() {
        assert_eq!(VALID_CONTAINERS[0], "mp4");
        assert_eq!(VALID_CONTAINERS.len(), 3);
    }

    #[test]
    fn test_setup_instructions_mention_required_vars() {
        let text = setup_instructions();
        for var in REQUIRED_ENV_VARS {
            assert!(text.contains(var), "setup instructions missing {}", var);
        }
    }
}
