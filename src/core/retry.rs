//! Retry logic for failed operations with exponential backoff.
//!
//! Provides a configurable retry strategy for upload operations with:
//! - Exponential backoff
//! - Max retry limits
//! - Telegram flood-wait ("retry after N") detection

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry strategy configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: crate::core::config::retry::MAX_ATTEMPTS,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Creates a new retry config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of retries.
    #[must_use]
    pub fn max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Sets the initial delay.
    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculates delay for a given attempt number (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped_delay)
    }
}

/// Runs an async operation, retrying on failure with exponential backoff.
///
/// Telegram flood-wait errors ("Retry after N") override the computed delay
/// so we wait at least as long as the API demands.
pub async fn retry_async<T, E, F, Fut>(config: &RetryConfig, op_name: &str, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= config.max_retries {
                    log::error!("{} failed after {} attempts: {}", op_name, attempt + 1, err);
                    return Err(err);
                }

                let mut delay = config.delay_for_attempt(attempt);
                if let Some(retry_after) = extract_retry_after(&err.to_string()) {
                    // Honor the API-mandated wait plus a small margin
                    let flood_delay = Duration::from_secs(retry_after + 1);
                    if flood_delay > delay {
                        delay = flood_delay;
                    }
                }

                attempt += 1;
                log::warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {}s...",
                    op_name,
                    attempt,
                    config.max_retries + 1,
                    err,
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Extracts the "retry after" seconds from a Telegram error message, if present.
pub fn extract_retry_after(error_str: &str) -> Option<u64> {
    let lower = error_str.to_lowercase();

    if let Some(pos) = lower.find("retry after ") {
        let after = &lower[pos + 12..];
        let num: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(secs) = num.parse() {
            return Some(secs);
        }
    }

    if let Some(pos) = lower.find("retry_after") {
        let after = &lower[pos + 11..];
        let num: String = after
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(secs) = num.parse() {
            return Some(secs);
        }
    }

    None
}
