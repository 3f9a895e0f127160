//! yt-dlp binary management and shared command arguments.

use crate::core::config;
use crate::core::error::AppError;
use crate::core::process::run_with_timeout;
use once_cell::sync::Lazy;
use std::time::Duration;
use tokio::process::Command as TokioCommand;

/// Cached resolved cookies file path (computed once at first use)
///
/// Relative paths and `~` are expanded; a configured but missing file
/// resolves to `None` with an error logged, so downloads proceed without it.
static CACHED_COOKIES_PATH: Lazy<Option<String>> = Lazy::new(|| {
    let cookies_file = match *config::YTDL_COOKIES_FILE {
        Some(ref f) if !f.is_empty() => f,
        _ => return None,
    };

    let cookies_path = if std::path::Path::new(cookies_file).is_absolute() {
        cookies_file.clone()
    } else {
        shellexpand::tilde(cookies_file).to_string()
    };

    let cookies_path_buf = std::path::Path::new(&cookies_path);
    if cookies_path_buf.exists() {
        cookies_path_buf
            .canonicalize()
            .ok()
            .map(|p| p.to_string_lossy().to_string())
    } else {
        log::error!("Cookies file not found: {}", cookies_path);
        None
    }
});

/// Returns cached cookies path as &'static str (no allocation per call)
pub fn cookies_path() -> Option<&'static str> {
    CACHED_COOKIES_PATH.as_ref().map(|s| s.as_str())
}

/// Appends `--cookies <path>` to a yt-dlp argument list when configured.
pub fn add_cookies_args(args: &mut Vec<String>) {
    if let Some(path) = cookies_path() {
        args.push("--cookies".to_string());
        args.push(path.to_string());
    }
}

/// Verifies that yt-dlp is installed and returns its version string.
///
/// Run once at startup so the pipeline fails fast with a clear message
/// instead of dying mid-download.
pub async fn ensure_ytdlp() -> Result<String, AppError> {
    let ytdl_bin = &*config::YTDL_BIN;

    let mut cmd = TokioCommand::new(ytdl_bin);
    cmd.arg("--version");

    let output = run_with_timeout(&mut cmd, Duration::from_secs(15))
        .await
        .map_err(|_| AppError::Download(format!("{} is not installed or not in PATH", ytdl_bin)))?;

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if !output.status.success() || version.is_empty() {
        return Err(AppError::Download(format!(
            "{} --version failed (is yt-dlp installed?)",
            ytdl_bin
        )));
    }

    log::info!("yt-dlp version: {}", version);
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_cookies_args_without_config() {
        // YTDL_COOKIES_FILE is unset in the test environment, so no args
        // should be appended.
        if cookies_path().is_none() {
            let mut args: Vec<String> = vec!["--dump-json".to_string()];
            add_cookies_args(&mut args);
            assert_eq!(args, vec!["--dump-json".to_string()]);
        }
    }
}
