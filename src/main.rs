use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use teloxide::prelude::*;

use tubegram::cli::{Cli, Commands};
use tubegram::core::validation::{validate_format_selection, validate_youtube_url};
use tubegram::core::{config, init_logger, log_cookies_configuration};
use tubegram::download::ytdlp;
use tubegram::download::{cleanup, download_video, fetch_video_info, prepare_thumbnail, DownloadResult, VideoInfo};
use tubegram::interactive;
use tubegram::telegram::{create_bot, upload_video, Bot};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the interactive pipeline or the
/// `info` subcommand.
#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    if let Err(e) = init_logger(&config::LOG_FILE_PATH) {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }

    let outcome = match cli.command {
        Some(Commands::Info { url, cookies }) => run_info(&url, cookies).await,
        Some(Commands::Run { cookies, output_dir }) => run_pipeline(cookies, output_dir).await,
        None => run_pipeline(None, None).await,
    };

    if let Err(e) = outcome {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}

/// Applies the cookies override, warning (like the original tool) when the
/// file does not exist instead of failing.
fn apply_cookies_override(cookies: Option<String>) {
    if let Some(path) = cookies {
        let expanded = shellexpand::tilde(&path).to_string();
        if std::path::Path::new(&expanded).exists() {
            // Must happen before the first download call reads the cached
            // cookies configuration.
            env::set_var("YTDL_COOKIES_FILE", &path);
        } else {
            println!("Warning: Cookie file {} not found", path);
        }
    }
}

fn print_format_tables(info: &VideoInfo) {
    println!("\nAvailable Video Formats:");
    for (id, label) in &info.video_formats {
        println!("{}: {}", id, label);
    }

    if info.audio_formats.is_empty() {
        println!("\nNo separate audio formats found");
    } else {
        println!("\nAvailable Audio Formats:");
        for (id, label) in &info.audio_formats {
            println!("{}: {}", id, label);
        }
    }
}

/// `info <url>`: print the format tables without downloading anything.
async fn run_info(url: &str, cookies: Option<String>) -> Result<()> {
    apply_cookies_override(cookies);

    let url = validate_youtube_url(url).context("Invalid YouTube URL")?;
    ytdlp::ensure_ytdlp().await?;

    println!("Fetching available formats...");
    let info = fetch_video_info(&url).await?;

    println!("\n{} ({}s)", info.title, info.duration);
    print_format_tables(&info);
    Ok(())
}

/// The interactive pipeline: validate, list formats, download, upload, cleanup.
async fn run_pipeline(cookies: Option<String>, output_dir: Option<String>) -> Result<()> {
    println!("tubegram");
    println!("=============================");

    // Check for required environment variables
    let missing = config::missing_env_vars();
    if !missing.is_empty() {
        eprintln!("ERROR: Missing required environment variables:");
        for var in &missing {
            eprintln!("- {}", var);
        }
        println!("{}", config::setup_instructions());
        anyhow::bail!("missing required environment variables");
    }

    if let Some(dir) = output_dir {
        env::set_var("DOWNLOAD_FOLDER", dir);
    }

    // Get YouTube video URL
    let url_input = interactive::prompt_line("Enter YouTube video URL: ")?;
    if url_input.is_empty() {
        anyhow::bail!("URL cannot be empty");
    }
    let url = validate_youtube_url(&url_input).context("Invalid YouTube URL")?;

    // Optional cookies file: flag wins, otherwise prompt
    let cookies = match cookies {
        Some(c) => Some(c),
        None => interactive::prompt_optional("Enter path to cookies file (optional, press Enter to skip): ")?,
    };
    apply_cookies_override(cookies);
    log_cookies_configuration();

    ytdlp::ensure_ytdlp().await?;

    // Build the bot up front so credential problems surface before any
    // download work happens.
    let bot = create_bot()?;
    let channel_id = config::channel_id().context("TELEGRAM_CHANNEL_ID must be a numeric chat id")?;
    let chat_id = ChatId(channel_id);

    println!("Fetching available formats...");
    let info = fetch_video_info(&url).await?;
    print_format_tables(&info);

    if info.video_formats.is_empty() {
        anyhow::bail!("no downloadable video formats found");
    }

    // Get video format
    let video_format = loop {
        let choice = interactive::prompt_line("\nEnter video format ID: ")?;
        match validate_format_selection(&info.video_formats, &choice) {
            Ok(()) => break choice,
            Err(_) => println!("Invalid format ID, please try again"),
        }
    };

    // Get optional audio format
    let mut audio_format = None;
    if !info.audio_formats.is_empty() {
        if let Some(choice) = interactive::prompt_optional("Enter audio format ID (optional, press Enter to skip): ")? {
            if validate_format_selection(&info.audio_formats, &choice).is_ok() {
                audio_format = Some(choice);
            } else {
                println!("Warning: Invalid audio format, proceeding without separate audio");
            }
        }
    }

    // Container format selection
    println!("\nAvailable container formats:");
    for (i, container) in config::VALID_CONTAINERS.iter().enumerate() {
        println!("{}. {}", i + 1, container);
    }
    let container = loop {
        let input = interactive::prompt_line(&format!(
            "Select container format [1-{}]: ",
            config::VALID_CONTAINERS.len()
        ))?;
        match interactive::parse_menu_choice(&input, config::VALID_CONTAINERS.len()) {
            Ok(None) => break config::VALID_CONTAINERS[0],
            Ok(Some(idx)) => break config::VALID_CONTAINERS[idx],
            Err(msg) => println!("{}", msg),
        }
    };
    println!("Using container format: {}", container);

    // Download and upload
    println!("\nDownloading video...");
    let download = download_video(&url, &video_format, audio_format.as_deref(), container, &info).await?;
    println!("Downloaded: {} ({}s)", download.title, download.duration);

    // The local files must be deleted whether or not the upload succeeds.
    let outcome = upload_stage(&bot, chat_id, &download, &info).await;

    println!("Cleaning up...");
    cleanup(&download);

    outcome?;
    println!("Done!");
    Ok(())
}

/// Thumbnail preparation + upload, separated so the caller can always run
/// cleanup afterwards.
async fn upload_stage(bot: &Bot, chat_id: ChatId, download: &DownloadResult, info: &VideoInfo) -> Result<()> {
    let prepared = match download.thumbnail_path {
        Some(ref path) => prepare_thumbnail(path).await,
        None => None,
    };

    println!("Uploading to Telegram...");
    upload_video(bot, chat_id, download, prepared.as_deref(), info.thumbnail.as_deref()).await?;
    println!("Upload successful!");
    Ok(())
}
