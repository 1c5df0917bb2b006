//! Schedule fetch pipeline: source → extractor → tagged outcome.
//!
//! Groups are fetched one after another. After every `batch_size` groups the
//! [`Pacer`] sleeps for `batch_delay` so the college site is not hammered;
//! total latency grows linearly with the number of groups.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::extract::extract;
use crate::source::{HttpSource, ScheduleSource};
use crate::types::{FetchOutcome, WeekSchedule};

/// Sleeps after every `batch_size` calls to [`Pacer::tick`].
#[derive(Debug, Clone)]
pub struct Pacer {
    batch_size: usize,
    delay: Duration,
    count: usize,
}

impl Pacer {
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            delay,
            count: 0,
        }
    }

    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new(config.batch_size, config.batch_delay())
    }

    /// Record one processed item, pausing if it completed a batch.
    /// Returns `true` if it paused.
    pub async fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count % self.batch_size != 0 || self.delay.is_zero() {
            return false;
        }
        tracing::debug!(
            processed = self.count,
            delay_ms = self.delay.as_millis() as u64,
            "pausing between batches"
        );
        tokio::time::sleep(self.delay).await;
        true
    }

    pub fn processed(&self) -> usize {
        self.count
    }
}

/// Fetches and extracts group schedules from a [`ScheduleSource`].
pub struct Fetcher<S = HttpSource> {
    source: S,
    batch_size: usize,
    batch_delay: Duration,
}

impl Fetcher<HttpSource> {
    /// Fetcher over HTTP using `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the configuration is invalid.
    pub fn http(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        Ok(Self::with_source(HttpSource::new(config)?, config))
    }
}

impl<S: ScheduleSource> Fetcher<S> {
    /// Fetcher over an arbitrary source, paced per `config`.
    pub fn with_source(source: S, config: &ScrapeConfig) -> Self {
        Self {
            source,
            batch_size: config.batch_size,
            batch_delay: config.batch_delay(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// A fresh pacer with this fetcher's batch settings.
    pub fn pacer(&self) -> Pacer {
        Pacer::new(self.batch_size, self.batch_delay)
    }

    /// Fetch one group. Never fails: transport problems become
    /// [`FetchOutcome::TransportError`], a page without weekday cells becomes
    /// [`FetchOutcome::NotPublished`] and an extractor failure becomes
    /// [`FetchOutcome::ExtractError`].
    pub async fn fetch_one(&self, group: &str) -> FetchOutcome {
        let html = match self.source.fetch_document(group).await {
            Ok(html) => html,
            Err(err) => {
                tracing::warn!(group, error = %err, "schedule fetch failed");
                return FetchOutcome::TransportError(err.to_string());
            }
        };

        classify(group, extract(&html))
    }

    /// Fetch every group sequentially with batch pacing.
    ///
    /// A failing group never aborts the batch; its outcome is recorded and
    /// the next group is fetched.
    pub async fn fetch_all<I, G>(&self, groups: I) -> BTreeMap<String, FetchOutcome>
    where
        I: IntoIterator<Item = G>,
        G: AsRef<str>,
    {
        let mut pacer = self.pacer();
        let mut outcomes = BTreeMap::new();
        for group in groups {
            let group = group.as_ref();
            let outcome = self.fetch_one(group).await;
            outcomes.insert(group.to_owned(), outcome);
            pacer.tick().await;
        }
        outcomes
    }
}

fn classify(group: &str, extracted: Result<WeekSchedule, ScrapeError>) -> FetchOutcome {
    match extracted {
        Ok(schedule) if schedule.is_empty() => {
            tracing::debug!(group, "no weekday cells in page");
            FetchOutcome::NotPublished
        }
        Ok(schedule) => FetchOutcome::Published(schedule),
        Err(err) => {
            tracing::error!(group, error = %err, "schedule extraction failed");
            FetchOutcome::ExtractError(err.to_string())
        }
    }
}
