//! Periodic store cleanup.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::store::{CleanupReport, ScheduleStore, StoreError};

/// Run [`ScheduleStore::cleanup`] on a blocking thread.
pub async fn run_cleanup(
    store: Arc<ScheduleStore>,
    days_old: u32,
) -> Result<CleanupReport, StoreError> {
    store.blocking(move |s| s.cleanup(days_old)).await
}

/// Spawn a task that runs cleanup every `interval` until `cancel` fires.
///
/// The first sweep runs one full interval after spawning. A failed sweep is
/// logged and retried on the next tick.
pub fn spawn_cleanup_loop(
    store: Arc<ScheduleStore>,
    interval: Duration,
    days_old: u32,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let period = interval.max(Duration::from_secs(1));
    tokio::spawn(async move {
        info!(interval_secs = period.as_secs(), days_old, "cleanup loop started");
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("cleanup loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    match run_cleanup(Arc::clone(&store), days_old).await {
                        Ok(report) if report.is_noop() => {}
                        Ok(report) => info!(?report, "periodic cleanup"),
                        Err(StoreError::Lock(reason)) => {
                            error!(%reason, "cleanup loop stopping");
                            break;
                        }
                        Err(e) => warn!(error = %e, "periodic cleanup failed"),
                    }
                }
            }
        }
    })
}
