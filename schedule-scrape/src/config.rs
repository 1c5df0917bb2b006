//! Scrape configuration with sensible defaults.
//!
//! [`ScrapeConfig`] controls where schedules are fetched from, request
//! timeouts and the pacing between batches of groups. The defaults are tuned
//! for polite scraping of a single college site.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ScrapeError;

/// Default schedule page; the group is passed as `?group=<name>`.
pub const DEFAULT_BASE_URL: &str = "https://oksei.ru/studentu/raspisanie_uchebnykh_zanyatij";

/// Configuration for fetching schedule pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Schedule page URL without the `group` query parameter.
    pub base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Skip TLS certificate verification. The college site has served an
    /// incomplete certificate chain in the past.
    pub accept_invalid_certs: bool,
    /// Number of groups fetched back to back before pausing.
    pub batch_size: usize,
    /// Pause after each batch, in milliseconds. 0 disables pacing.
    pub batch_delay_ms: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_seconds: 15,
            user_agent: None,
            accept_invalid_certs: false,
            batch_size: 5,
            batch_delay_ms: 1000,
        }
    }
}

impl ScrapeConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `base_url` must be an absolute http(s) URL
    /// - `timeout_seconds` must be greater than 0
    /// - `batch_size` must be greater than 0
    pub fn validate(&self) -> Result<(), ScrapeError> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ScrapeError::Config(format!("invalid base_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScrapeError::Config(
                "base_url must use http or https".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ScrapeError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ScrapeError::Config(
                "batch_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}
