// SPDX-License-Identifier: MIT

//! Per-team installation record stored in Firestore.

use serde::{Deserialize, Serialize};

/// One Slack team's configuration: delivery target, club subscriptions,
/// and the known-activity dedup ledger. Document ID is the Slack team ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installation {
    pub slack: SlackInstallation,
    #[serde(default)]
    pub strava: StravaSubscriptions,
    /// When the team installed the app (ISO 8601)
    pub installed_at: String,
}

/// Slack-side details captured during OAuth installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackInstallation {
    pub access_token: String,
    pub user_id: String,
    pub team_id: String,
    pub team_name: String,
    /// Absent means "do not post"
    pub incoming_webhook: Option<IncomingWebhook>,
}

/// Incoming-webhook details from the Slack OAuth response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingWebhook {
    pub channel: String,
    pub channel_id: String,
    pub configuration_url: String,
    pub url: String,
}

/// Strava-side subscription state for an installation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StravaSubscriptions {
    /// Fallback access token for clubs without their own
    #[serde(default)]
    pub access_token: Option<String>,
    /// Subscribed clubs, in the order they were added
    #[serde(default)]
    pub clubs: Vec<ClubSubscription>,
    /// Dedup ledger of activities already posted to the webhook
    #[serde(default)]
    pub known_activities: Vec<KnownActivity>,
}

/// A subscribed Strava club.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubSubscription {
    pub id: u64,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// One entry in the known-activity ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownActivity {
    pub id: u64,
    /// When we first observed the activity (unix millis)
    pub observed_at: i64,
}

impl Installation {
    /// Create a fresh installation with no subscriptions.
    pub fn new(slack: SlackInstallation, now: &str) -> Self {
        Self {
            slack,
            strava: StravaSubscriptions::default(),
            installed_at: now.to_string(),
        }
    }

    pub fn team_id(&self) -> &str {
        &self.slack.team_id
    }

    /// The webhook URL to post to, if one is configured.
    pub fn webhook_url(&self) -> Option<&str> {
        self.slack
            .incoming_webhook
            .as_ref()
            .map(|wh| wh.url.as_str())
    }

    pub fn is_watching(&self, club_id: u64) -> bool {
        self.strava.clubs.iter().any(|c| c.id == club_id)
    }

    /// Add a club subscription. Returns `false` if the club was already
    /// watched (the list is left unchanged).
    pub fn add_club(&mut self, club_id: u64) -> bool {
        if self.is_watching(club_id) {
            return false;
        }
        self.strava.clubs.push(ClubSubscription {
            id: club_id,
            access_token: None,
        });
        true
    }

    /// Remove a club subscription. Returns `false` if the club was not
    /// watched.
    pub fn remove_club(&mut self, club_id: u64) -> bool {
        if !self.is_watching(club_id) {
            return false;
        }
        self.strava.clubs.retain(|c| c.id != club_id);
        true
    }

    /// Comma-separated club IDs for user-facing messages.
    pub fn club_list(&self) -> String {
        self.strava
            .clubs
            .iter()
            .map(|c| c.id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn knows_activity(&self, activity_id: u64) -> bool {
        self.strava
            .known_activities
            .iter()
            .any(|k| k.id == activity_id)
    }

    /// Record activities as posted. IDs already present are skipped, so an
    /// ID appears in the ledger at most once.
    pub fn mark_known(&mut self, ids: &[u64], observed_at: i64) {
        for &id in ids {
            if !self.knows_activity(id) {
                self.strava
                    .known_activities
                    .push(KnownActivity { id, observed_at });
            }
        }
    }

    /// Drop ledger entries observed before `cutoff` (unix millis). Anything
    /// older than the lookback window can no longer be re-fetched, so
    /// keeping it only grows the document.
    pub fn prune_known(&mut self, cutoff: i64) {
        self.strava
            .known_activities
            .retain(|k| k.observed_at >= cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_installation() -> Installation {
        Installation::new(
            SlackInstallation {
                access_token: "xoxp-test".to_string(),
                user_id: "U123".to_string(),
                team_id: "T123".to_string(),
                team_name: "Test Team".to_string(),
                incoming_webhook: None,
            },
            "2024-01-01T00:00:00Z",
        )
    }

    #[test]
    fn test_add_club_is_idempotent() {
        let mut installation = test_installation();

        assert!(installation.add_club(336978));
        assert!(!installation.add_club(336978));

        let ids: Vec<u64> = installation.strava.clubs.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![336978]);
    }

    #[test]
    fn test_remove_unwatched_club_is_noop() {
        let mut installation = test_installation();
        installation.add_club(111);

        assert!(!installation.remove_club(336978));
        assert_eq!(installation.strava.clubs.len(), 1);

        assert!(installation.remove_club(111));
        assert!(installation.strava.clubs.is_empty());
    }

    #[test]
    fn test_mark_known_deduplicates() {
        let mut installation = test_installation();

        installation.mark_known(&[1, 2, 3], 1000);
        installation.mark_known(&[2, 3, 4], 2000);

        let ids: Vec<u64> = installation
            .strava
            .known_activities
            .iter()
            .map(|k| k.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(installation.knows_activity(2));
        assert!(!installation.knows_activity(5));
    }

    #[test]
    fn test_prune_known_drops_old_entries() {
        let mut installation = test_installation();
        installation.mark_known(&[1], 1000);
        installation.mark_known(&[2], 5000);

        installation.prune_known(2000);

        let ids: Vec<u64> = installation
            .strava
            .known_activities
            .iter()
            .map(|k| k.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }
}
