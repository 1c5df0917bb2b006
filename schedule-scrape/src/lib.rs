//! # schedule-scrape
//!
//! Scraper for the college's weekly class schedule pages.
//!
//! One page per student group (`BASE_URL?group=<name>`) lists the week's
//! lessons in one table cell per weekday. This crate fetches those pages,
//! extracts the lessons per weekday and annotates every day with its
//! calendar date.
//!
//! ## Design
//!
//! - One GET per group, no retries, bounded timeout per request
//! - Groups are fetched sequentially with a pause after every batch
//! - Transport failures and unpublished schedules are reported as tagged
//!   [`FetchOutcome`] values, never as errors that abort a batch
//! - Date helpers and the extractor fail soft on malformed input

pub mod config;
pub mod dates;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod http;
pub mod source;
pub mod types;

pub use config::ScrapeConfig;
pub use error::{Result, ScrapeError};
pub use fetch::{Fetcher, Pacer};
pub use source::{HttpSource, ScheduleSource};
pub use types::{DaySchedule, FetchOutcome, WeekSchedule, Weekday};

/// Fetch one group's schedule with the given configuration.
///
/// Convenience wrapper that builds an HTTP [`Fetcher`] for a single call.
///
/// # Errors
///
/// Returns [`ScrapeError::Config`] if `config` is invalid. Fetch failures
/// are reported in the returned [`FetchOutcome`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> schedule_scrape::Result<()> {
/// let config = schedule_scrape::ScrapeConfig::default();
/// let outcome = schedule_scrape::fetch_group("2ис1", &config).await?;
/// println!("published: {}", outcome.is_published());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_group(group: &str, config: &ScrapeConfig) -> Result<FetchOutcome> {
    let fetcher = Fetcher::http(config)?;
    Ok(fetcher.fetch_one(group).await)
}
