// SPDX-License-Identifier: MIT

//! Owns the repeating reconciliation timer with an explicit lifecycle.
//!
//! Tests never need to wait on real time: they call
//! `SyncService::run_all` directly and leave the scheduler stopped.

use std::sync::Arc;
use std::time::Duration;

use crate::services::sync::SyncService;

/// Delay before the first pass after startup.
const INITIAL_DELAY: Duration = Duration::from_millis(2500);

/// Schedules reconciliation passes on a fixed interval.
pub struct SyncScheduler {
    sync: Arc<SyncService>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl SyncScheduler {
    pub fn new(sync: Arc<SyncService>) -> Self {
        Self { sync, handle: None }
    }

    /// Start the timer: one pass shortly after startup, then one per
    /// interval. Calling `start` twice replaces the previous timer.
    pub fn start(&mut self, interval: Duration) {
        self.stop();

        let sync = self.sync.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(INITIAL_DELAY).await;
            sync.run_all().await;

            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; we already ran
            ticker.tick().await;

            loop {
                ticker.tick().await;
                sync.run_all().await;
            }
        });

        self.handle = Some(handle);
    }

    /// Stop the timer. An in-flight pass is cancelled at its next await
    /// point; the per-team locks keep a half-finished pass from corrupting
    /// anything.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::FirestoreDb;
    use crate::services::slack::SlackNotifier;
    use crate::services::strava::{StravaClient, StravaService};

    fn scheduler() -> SyncScheduler {
        let sync = Arc::new(SyncService::new(
            FirestoreDb::new_mock(),
            StravaService::new(StravaClient::new(), "t".to_string()),
            SlackNotifier::new(),
        ));
        SyncScheduler::new(sync)
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let mut scheduler = scheduler();
        assert!(!scheduler.is_running());

        scheduler.start(Duration::from_secs(60));
        assert!(scheduler.is_running());

        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_restart_replaces_timer() {
        let mut scheduler = scheduler();
        scheduler.start(Duration::from_secs(60));
        scheduler.start(Duration::from_secs(120));
        assert!(scheduler.is_running());
        scheduler.stop();
    }
}
