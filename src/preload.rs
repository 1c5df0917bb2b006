//! Weekly preload of every group's schedule into the store.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use schedule_scrape::{FetchOutcome, Fetcher, ScheduleSource};

use crate::store::ScheduleStore;

/// Week identifier of `date`: its ISO Monday as `YYYY-MM-DD`.
pub fn week_start_key(date: NaiveDate) -> String {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    monday.format("%Y-%m-%d").to_string()
}

/// Week identifier of the current local date.
pub fn current_week_start() -> String {
    week_start_key(chrono::Local::now().date_naive())
}

/// Tally of one preload run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PreloadReport {
    pub total: usize,
    /// Already stored with a non-empty schedule for the week; not fetched.
    pub skipped: usize,
    pub published: usize,
    /// Fetched, but the page had no schedule. Stored as empty.
    pub not_published: usize,
    /// Fetch failed. Stored as empty.
    pub transport_errors: usize,
    /// The extractor failed on a fetched page. Stored as empty.
    pub extract_errors: usize,
    /// The store rejected the save.
    pub store_errors: usize,
}

impl PreloadReport {
    /// Groups that have a record for the week after the run.
    pub fn stored(&self) -> usize {
        self.total - self.store_errors
    }
}

/// Fetch and save every group without a published schedule for
/// `week_start`.
///
/// Every fetched group is saved, with an empty schedule when nothing was
/// published or the fetch failed, so each group has a record for the week.
/// Empty records are fetched again on the next run. Fetches are paced like
/// [`Fetcher::fetch_all`]; skipped groups cost no request and do not count
/// toward a batch. Store calls run on the blocking pool.
pub async fn preload_all<S, I, G>(
    store: &Arc<ScheduleStore>,
    fetcher: &Fetcher<S>,
    groups: I,
    week_start: &str,
) -> PreloadReport
where
    S: ScheduleSource,
    I: IntoIterator<Item = G>,
    G: AsRef<str>,
{
    let groups: Vec<G> = groups.into_iter().collect();
    let total = groups.len();
    let mut report = PreloadReport {
        total,
        ..Default::default()
    };
    let mut pacer = fetcher.pacer();
    tracing::info!(total, week_start, "preload started");

    for (i, group) in groups.iter().enumerate() {
        let group = group.as_ref();
        let position = i + 1;

        let (lookup_group, lookup_week) = (group.to_owned(), week_start.to_owned());
        let stored = store
            .blocking(move |s| s.get_schedule(&lookup_group, Some(&lookup_week)))
            .await;
        match stored {
            Ok(Some(schedule)) if !schedule.is_empty() => {
                tracing::debug!(position, total, group, "already stored, skipping");
                report.skipped += 1;
                continue;
            }
            Ok(Some(_)) => {
                tracing::debug!(position, total, group, "stored schedule empty, refetching");
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(group, error = %err, "stored schedule unreadable, refetching");
            }
        }

        let outcome = fetcher.fetch_one(group).await;
        match &outcome {
            FetchOutcome::Published(schedule) => {
                report.published += 1;
                let filled = schedule.days_with_lessons();
                if filled.is_empty() {
                    tracing::warn!(position, total, group, "schedule has no lessons");
                } else {
                    tracing::info!(position, total, group, days = filled.len(), "loaded");
                }
            }
            FetchOutcome::NotPublished => {
                report.not_published += 1;
                tracing::warn!(position, total, group, "schedule not published");
            }
            FetchOutcome::TransportError(reason) => {
                report.transport_errors += 1;
                tracing::error!(position, total, group, %reason, "fetch failed");
            }
            FetchOutcome::ExtractError(reason) => {
                report.extract_errors += 1;
                tracing::error!(position, total, group, %reason, "extraction failed");
            }
        }

        let (save_group, save_week) = (group.to_owned(), week_start.to_owned());
        let schedule = outcome.into_schedule();
        let saved = store
            .blocking(move |s| s.save_schedule(&save_group, &schedule, &save_week))
            .await;
        if let Err(err) = saved {
            report.store_errors += 1;
            tracing::error!(group, error = %err, "failed to save schedule");
        }

        pacer.tick().await;
    }

    tracing::info!(
        stored = report.stored(),
        total,
        skipped = report.skipped,
        published = report.published,
        "preload finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use schedule_scrape::{ScrapeConfig, ScrapeError, WeekSchedule};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WEEK: &str = "2025-12-01";

    const PAGE: &str = r#"<center>Расписание на 01.12.2025-06.12.2025</center>
        <table><tr><td id="monday"><ul><li>1. Математика</li></ul></td></tr></table>"#;

    /// `ok` groups get a page, `blank` groups a page without cells, `flaky`
    /// groups fail on their first request only, the rest always fail.
    struct ScriptedSource {
        calls: AtomicUsize,
        seen: Mutex<HashSet<String>>,
    }

    impl ScheduleSource for ScriptedSource {
        async fn fetch_document(&self, group: &str) -> Result<String, ScrapeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let first_call = self.seen.lock().expect("seen lock").insert(group.to_owned());
            match group {
                g if g.starts_with("ok") => Ok(PAGE.to_owned()),
                g if g.starts_with("blank") => Ok("<html><body></body></html>".to_owned()),
                g if g.starts_with("flaky") && !first_call => Ok(PAGE.to_owned()),
                _ => Err(ScrapeError::Timeout("deadline elapsed".into())),
            }
        }
    }

    fn fetcher() -> Fetcher<ScriptedSource> {
        let config = ScrapeConfig {
            batch_delay_ms: 0,
            ..Default::default()
        };
        Fetcher::with_source(
            ScriptedSource {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(HashSet::new()),
            },
            &config,
        )
    }

    fn shared_store() -> Arc<ScheduleStore> {
        Arc::new(ScheduleStore::open_in_memory().expect("store"))
    }

    fn fetcher_calls(fetcher: &Fetcher<ScriptedSource>) -> usize {
        fetcher.source().calls.load(Ordering::SeqCst)
    }

    #[test]
    fn week_start_is_iso_monday() {
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
        assert_eq!(week_start_key(day(2025, 12, 1)), "2025-12-01");
        assert_eq!(week_start_key(day(2025, 12, 4)), "2025-12-01");
        assert_eq!(week_start_key(day(2025, 12, 7)), "2025-12-01");
        assert_eq!(week_start_key(day(2025, 12, 8)), "2025-12-08");
        assert_eq!(week_start_key(day(2026, 1, 1)), "2025-12-29");
    }

    #[tokio::test]
    async fn stores_every_group_whatever_the_outcome() {
        let store = shared_store();
        let fetcher = fetcher();

        let report = preload_all(&store, &fetcher, ["ok-1", "blank-1", "down-1"], WEEK).await;
        assert_eq!(
            report,
            PreloadReport {
                total: 3,
                skipped: 0,
                published: 1,
                not_published: 1,
                transport_errors: 1,
                extract_errors: 0,
                store_errors: 0,
            }
        );
        assert_eq!(report.stored(), 3);

        let published = store
            .get_schedule("ok-1", Some(WEEK))
            .expect("get")
            .expect("present");
        assert_eq!(published.date_range, "01.12.2025-06.12.2025");
        for group in ["blank-1", "down-1"] {
            let stored = store.get_schedule(group, None).expect("get").expect("present");
            assert_eq!(stored, WeekSchedule::default());
        }
    }

    #[tokio::test]
    async fn second_run_skips_only_published_groups() {
        let store = shared_store();
        let fetcher = fetcher();

        preload_all(&store, &fetcher, ["ok-1", "down-1"], WEEK).await;
        let second = preload_all(&store, &fetcher, ["ok-1", "down-1", "ok-2"], WEEK).await;

        assert_eq!(second.skipped, 1);
        assert_eq!(second.published, 1);
        assert_eq!(second.transport_errors, 1);
        // ok-1 once, down-1 twice, ok-2 once.
        assert_eq!(fetcher_calls(&fetcher), 4);
    }

    #[tokio::test]
    async fn failed_group_is_fetched_again_once_the_site_recovers() {
        let store = shared_store();
        let fetcher = fetcher();

        let first = preload_all(&store, &fetcher, ["flaky-1"], WEEK).await;
        assert_eq!(first.transport_errors, 1);
        assert!(store
            .get_schedule("flaky-1", Some(WEEK))
            .expect("get")
            .expect("placeholder")
            .is_empty());

        let second = preload_all(&store, &fetcher, ["flaky-1"], WEEK).await;
        assert_eq!(second.skipped, 0);
        assert_eq!(second.published, 1);
        assert_eq!(fetcher_calls(&fetcher), 2);

        let stored = store
            .get_schedule("flaky-1", Some(WEEK))
            .expect("get")
            .expect("present");
        assert_eq!(stored.days_with_lessons().len(), 1);
        assert_eq!(store.group_records("flaky-1").expect("records").len(), 1);

        let third = preload_all(&store, &fetcher, ["flaky-1"], WEEK).await;
        assert_eq!(third.skipped, 1);
        assert_eq!(fetcher_calls(&fetcher), 2);
    }

    #[tokio::test]
    async fn new_week_fetches_again() {
        let store = shared_store();
        let fetcher = fetcher();

        preload_all(&store, &fetcher, ["ok-1"], WEEK).await;
        let next = preload_all(&store, &fetcher, ["ok-1"], "2025-12-08").await;
        assert_eq!(next.skipped, 0);
        assert_eq!(store.group_records("ok-1").expect("records").len(), 2);
    }
}
