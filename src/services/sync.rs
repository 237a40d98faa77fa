// SPDX-License-Identifier: MIT

//! Reconciliation loop: fetch club activities, diff against the known
//! ledger, post the delta to the team webhook, persist.
//!
//! Each installation's pass runs under a per-team async lock so an
//! out-of-band "check now" overlapping the timer cannot double-post or
//! overwrite the ledger (lost-update race in the old design).

use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::format::format_activities;
use crate::models::{ClubActivity, Installation};
use crate::services::slack::SlackNotifier;
use crate::services::strava::StravaService;

/// How far back a pass looks for candidate activities.
pub const LOOKBACK_DAYS: i64 = 7;

/// Ledger entries older than this are pruned on write. Twice the lookback
/// window, so activities near the cutoff still deduplicate.
const KNOWN_RETENTION_DAYS: i64 = 2 * LOOKBACK_DAYS;

/// Bounded size of the diagnostic check log.
const CHECK_LOG_CAP: usize = 50;

/// One reconciliation pass outcome, for the debug command.
#[derive(Debug, Clone)]
pub struct CheckEntry {
    pub at: DateTime<Utc>,
    pub new_count: usize,
}

/// Drives fetch-diff-post-persist across all installations.
pub struct SyncService {
    db: FirestoreDb,
    strava: StravaService,
    slack: SlackNotifier,
    started_at: DateTime<Utc>,
    /// Recent pass outcomes, oldest first. Diagnostic only, lost on restart.
    check_log: Mutex<VecDeque<CheckEntry>>,
    /// Per-team mutex serializing read-diff-post-persist.
    team_locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl SyncService {
    pub fn new(db: FirestoreDb, strava: StravaService, slack: SlackNotifier) -> Self {
        Self {
            db,
            strava,
            slack,
            started_at: Utc::now(),
            check_log: Mutex::new(VecDeque::new()),
            team_locks: DashMap::new(),
        }
    }

    /// When the process came up, for debug output.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Snapshot of the check log, oldest first.
    pub fn check_log(&self) -> Vec<CheckEntry> {
        self.check_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    fn record_check(&self, at: DateTime<Utc>, new_count: usize) {
        let mut log = self.check_log.lock().unwrap_or_else(|e| e.into_inner());
        if log.len() >= CHECK_LOG_CAP {
            log.pop_front();
        }
        log.push_back(CheckEntry { at, new_count });
    }

    /// Run one pass over every installation. Failures are contained per
    /// installation; the loop always proceeds to the next one.
    pub async fn run_all(&self) {
        if !self.db.is_connected() {
            tracing::warn!("Meant to run reconciliation, but database not connected");
            return;
        }

        let installations = match self.db.list_installations().await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list installations for reconciliation");
                return;
            }
        };

        tracing::debug!(count = installations.len(), "Reconciliation pass starting");

        for installation in installations {
            let team_id = installation.team_id().to_string();
            if let Err(e) = self.run_for_team(&team_id).await {
                tracing::warn!(team_id = %team_id, error = %e, "Reconciliation pass failed");
            }
        }
    }

    /// Run one pass for a single team, holding its lock for the whole
    /// read-diff-post-persist sequence. The record is re-read under the
    /// lock so concurrent passes always see each other's writes.
    pub async fn run_for_team(&self, team_id: &str) -> Result<usize, AppError> {
        let lock = self
            .team_locks
            .entry(team_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let mut installation = self
            .db
            .get_installation(team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Installation for team {}", team_id)))?;

        let now = Utc::now();
        let result = self.run_pass(&mut installation, now).await;

        // The check log records every pass, successful or not
        self.record_check(now, *result.as_ref().unwrap_or(&0));
        result
    }

    async fn run_pass(
        &self,
        installation: &mut Installation,
        now: DateTime<Utc>,
    ) -> Result<usize, AppError> {
        let since = now - Duration::days(LOOKBACK_DAYS);
        let candidates = self
            .strava
            .get_activities_since(&installation.strava, since)
            .await;

        tracing::debug!(
            team_id = %installation.team_id(),
            candidates = candidates.len(),
            since = %since,
            "Fetched candidate activities"
        );

        let new = Self::partition_new(installation, candidates);
        if new.is_empty() {
            return Ok(0);
        }

        match installation.webhook_url() {
            Some(url) => {
                self.slack
                    .post_attachments(url, format_activities(&new))
                    .await?;
            }
            None => {
                tracing::warn!(
                    team_id = %installation.team_id(),
                    "No incoming webhook configured, not posting"
                );
            }
        }

        // Mark as known even when there was nowhere to post, so a webhook
        // configured later does not flood the channel with history.
        let ids: Vec<u64> = new.iter().map(ClubActivity::dedup_id).collect();
        installation.mark_known(&ids, now.timestamp_millis());
        installation
            .prune_known((now - Duration::days(KNOWN_RETENTION_DAYS)).timestamp_millis());

        self.db.upsert_installation(installation).await?;

        tracing::info!(
            team_id = %installation.team_id(),
            posted = new.len(),
            "Reconciliation pass posted new activities"
        );

        Ok(new.len())
    }

    /// Candidates not yet in the installation's ledger, with duplicates
    /// inside the batch itself collapsed.
    pub fn partition_new(
        installation: &Installation,
        candidates: Vec<ClubActivity>,
    ) -> Vec<ClubActivity> {
        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|a| {
                let id = a.dedup_id();
                !installation.knows_activity(id) && seen.insert(id)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::installation::SlackInstallation;
    use crate::models::ActivityAthlete;
    use crate::services::strava::StravaClient;

    fn installation() -> Installation {
        Installation::new(
            SlackInstallation {
                access_token: "xoxp".to_string(),
                user_id: "U1".to_string(),
                team_id: "T1".to_string(),
                team_name: "Team".to_string(),
                incoming_webhook: None,
            },
            "2024-01-01T00:00:00Z",
        )
    }

    fn activity(id: u64) -> ClubActivity {
        ClubActivity {
            id: Some(id),
            athlete: ActivityAthlete {
                id: None,
                username: None,
                firstname: "A".to_string(),
                lastname: "B".to_string(),
                profile: None,
            },
            name: format!("Activity {}", id),
            distance: 1000.0,
            moving_time: 600,
            elapsed_time: 700,
            total_elevation_gain: 0.0,
            sport: "Run".to_string(),
            start_date: "2024-03-01T10:00:00Z".to_string(),
            average_speed: 2.0,
            achievement_count: 0,
        }
    }

    #[test]
    fn test_empty_ledger_marks_all_new() {
        let installation = installation();
        let candidates = vec![activity(1), activity(2), activity(3)];

        let new = SyncService::partition_new(&installation, candidates);
        assert_eq!(new.len(), 3);
    }

    #[test]
    fn test_known_ids_never_resurface() {
        let mut inst = installation();
        inst.mark_known(&[1, 2], 0);

        let new = SyncService::partition_new(&inst, vec![activity(1), activity(2), activity(3)]);
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].dedup_id(), 3);

        // Second run after marking: nothing new
        inst.mark_known(&[3], 0);
        let again = SyncService::partition_new(&inst, vec![activity(1), activity(2), activity(3)]);
        assert!(again.is_empty());
    }

    #[test]
    fn test_within_batch_duplicates_collapse() {
        let inst = installation();
        let new = SyncService::partition_new(&inst, vec![activity(7), activity(7)]);
        assert_eq!(new.len(), 1);
    }

    #[test]
    fn test_check_log_is_bounded() {
        let service = SyncService::new(
            FirestoreDb::new_mock(),
            StravaService::new(StravaClient::new(), "t".to_string()),
            SlackNotifier::new(),
        );

        for i in 0..(CHECK_LOG_CAP + 10) {
            service.record_check(Utc::now(), i);
        }

        let log = service.check_log();
        assert_eq!(log.len(), CHECK_LOG_CAP);
        // Oldest entries were dropped first
        assert_eq!(log.first().map(|e| e.new_count), Some(10));
        assert_eq!(log.last().map(|e| e.new_count), Some(CHECK_LOG_CAP + 9));
    }

    #[tokio::test]
    async fn test_run_all_skips_when_disconnected() {
        let service = SyncService::new(
            FirestoreDb::new_mock(),
            StravaService::new(StravaClient::new(), "t".to_string()),
            SlackNotifier::new(),
        );

        // Must return quietly without touching the network
        service.run_all().await;
        assert!(service.check_log().is_empty());
    }
}
