//! Bot initialization
//!
//! Builds the teloxide Bot from TELEGRAM_BOT_TOKEN with an HTTP client tuned
//! for long uploads, optionally pointed at a local Bot API server.

use reqwest::ClientBuilder;

use crate::core::config;
use crate::telegram::Bot;

/// Creates a Bot instance with custom or default API URL
///
/// The HTTP client timeout is raised to 15 minutes: uploading a large video
/// over a slow uplink takes far longer than reqwest's default.
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token, invalid BOT_API_URL, or client build failure
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::bot_token().ok_or_else(|| anyhow::anyhow!("TELEGRAM_BOT_TOKEN is not set"))?;

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token, client);

    // Check if local Bot API server is configured
    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}
