//! Telegram bot integration

pub mod bot;
pub mod upload;

/// The bot type used throughout the crate
pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::create_bot;
pub use upload::upload_video;
