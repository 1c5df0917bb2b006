//! Error types for the schedule-scrape crate.

/// Errors that can occur while fetching or parsing a schedule page.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// An HTTP request to the schedule site failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The page could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid scrape configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ScrapeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

/// Convenience type alias for schedule-scrape results.
pub type Result<T> = std::result::Result<T, ScrapeError>;
