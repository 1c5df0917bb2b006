//! Error types for the schedule bot.

use crate::store::StoreError;
use schedule_scrape::ScrapeError;

/// Top-level error type for the schedule bot.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Schedule store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Scraper setup error.
    #[error("scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BotError>;
