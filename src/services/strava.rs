// SPDX-License-Identifier: MIT

//! Strava API client for club activities, members, and club details.
//!
//! Handles:
//! - Per-club activity listing with pagination size
//! - Member listing and club detail lookups (club details cached briefly)
//! - Client-side "since" filtering on activity start times
//! - Partial-failure tolerance: one club failing never aborts the others

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::installation::{ClubSubscription, StravaSubscriptions};
use crate::models::{ClubActivity, ClubMember, ClubWithMembers, StravaClub};

/// How long a fetched club detail stays fresh.
const CLUB_CACHE_TTL_SECS: i64 = 10 * 60;

/// Low-level Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
}

impl StravaClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://www.strava.com/api/v3".to_string(),
        }
    }

    /// Client pointed at a different base URL (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// List recent activities for a club.
    pub async fn list_club_activities(
        &self,
        access_token: &str,
        club_id: u64,
        per_page: u32,
    ) -> Result<Vec<ClubActivity>, AppError> {
        let url = format!(
            "{}/clubs/{}/activities?per_page={}",
            self.base_url, club_id, per_page
        );
        self.get_json(&url, access_token).await
    }

    /// List members of a club.
    pub async fn list_club_members(
        &self,
        access_token: &str,
        club_id: u64,
        per_page: u32,
    ) -> Result<Vec<ClubMember>, AppError> {
        let url = format!(
            "{}/clubs/{}/members?per_page={}",
            self.base_url, club_id, per_page
        );
        self.get_json(&url, access_token).await
    }

    /// Get details for a single club.
    pub async fn get_club(&self, access_token: &str, club_id: u64) -> Result<StravaClub, AppError> {
        let url = format!("{}/clubs/{}", self.base_url, club_id);
        self.get_json(&url, access_token).await
    }

    /// List the clubs the authenticated athlete belongs to.
    pub async fn list_athlete_clubs(
        &self,
        access_token: &str,
    ) -> Result<Vec<StravaClub>, AppError> {
        let url = format!("{}/athlete/clubs", self.base_url);
        self.get_json(&url, access_token).await
    }

    /// Exchange an OAuth authorization code for an athlete access token.
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<StravaTokenResponse, AppError> {
        let response = self
            .http
            .post("https://www.strava.com/oauth/token")
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token exchange failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(AppError::StravaApi("rate limited".to_string()));
            }

            if status.as_u16() == 401 {
                return Err(AppError::StravaApi("access token rejected".to_string()));
            }

            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

impl Default for StravaClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Token exchange response from Strava OAuth.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaTokenResponse {
    pub access_token: String,
    pub athlete: StravaOAuthAthlete,
}

/// Athlete info from the OAuth token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaOAuthAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
}

/// Cached club detail with fetch time.
#[derive(Clone)]
struct CachedClub {
    club: StravaClub,
    fetched_at: DateTime<Utc>,
}

/// High-level activity source that resolves per-club access tokens and
/// tolerates per-club fetch failures.
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    /// Fallback token for clubs and installations without their own
    default_token: String,
    club_cache: std::sync::Arc<DashMap<u64, CachedClub>>,
}

impl StravaService {
    pub fn new(client: StravaClient, default_token: String) -> Self {
        Self {
            client,
            default_token,
            club_cache: std::sync::Arc::new(DashMap::new()),
        }
    }

    /// The token to use for a club: club token, then installation token,
    /// then the configured default.
    fn resolve_token<'a>(&'a self, subs: &'a StravaSubscriptions, club: &'a ClubSubscription) -> &'a str {
        club.access_token
            .as_deref()
            .or(subs.access_token.as_deref())
            .unwrap_or(&self.default_token)
    }

    /// Fetch recent activities across all subscribed clubs.
    ///
    /// A fetch failure for one club is logged and treated as zero
    /// activities for that club.
    pub async fn get_activities(
        &self,
        subs: &StravaSubscriptions,
        per_club: u32,
    ) -> Vec<ClubActivity> {
        let mut all = Vec::new();

        for club in &subs.clubs {
            let token = self.resolve_token(subs, club);

            match self
                .client
                .list_club_activities(token, club.id, per_club)
                .await
            {
                Ok(activities) => {
                    tracing::debug!(
                        club_id = club.id,
                        count = activities.len(),
                        "Fetched club activities"
                    );
                    all.extend(activities);
                }
                Err(e) => {
                    tracing::warn!(
                        club_id = club.id,
                        error = %e,
                        "Failed to fetch club activities, treating as empty"
                    );
                }
            }
        }

        all
    }

    /// Fetch recent activities that started after `since`.
    ///
    /// Strava's club endpoint has no server-side time filter, so the
    /// cutoff is applied client-side after fetch.
    pub async fn get_activities_since(
        &self,
        subs: &StravaSubscriptions,
        since: DateTime<Utc>,
    ) -> Vec<ClubActivity> {
        let fetched = self.get_activities(subs, 100).await;
        Self::filter_since(fetched, since)
    }

    /// Keep only activities with a parseable start time after `cutoff`.
    pub fn filter_since(activities: Vec<ClubActivity>, cutoff: DateTime<Utc>) -> Vec<ClubActivity> {
        activities
            .into_iter()
            .filter(|a| a.start_time().is_some_and(|start| start > cutoff))
            .collect()
    }

    /// Get club details, served from the cache when fresh.
    pub async fn get_club_cached(
        &self,
        access_token: &str,
        club_id: u64,
    ) -> Result<StravaClub, AppError> {
        if let Some(cached) = self.club_cache.get(&club_id) {
            if Utc::now() - cached.fetched_at < Duration::seconds(CLUB_CACHE_TTL_SECS) {
                return Ok(cached.club.clone());
            }
        }

        let club = self.client.get_club(access_token, club_id).await?;
        self.club_cache.insert(
            club_id,
            CachedClub {
                club: club.clone(),
                fetched_at: Utc::now(),
            },
        );

        Ok(club)
    }

    /// Fetch each subscribed club with its member roster.
    ///
    /// Clubs that fail to resolve are skipped with a warning.
    pub async fn get_members(&self, subs: &StravaSubscriptions) -> Vec<ClubWithMembers> {
        let mut result = Vec::new();

        for club_sub in &subs.clubs {
            let token = self.resolve_token(subs, club_sub);

            let club = match self.get_club_cached(token, club_sub.id).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(club_id = club_sub.id, error = %e, "Failed to fetch club");
                    continue;
                }
            };

            let members = match self.client.list_club_members(token, club_sub.id, 100).await {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(club_id = club_sub.id, error = %e, "Failed to fetch members");
                    continue;
                }
            };

            result.push(ClubWithMembers { club, members });
        }

        result
    }

    /// List the clubs an athlete token can see (used after Strava OAuth).
    pub async fn list_athlete_clubs(&self, access_token: &str) -> Result<Vec<StravaClub>, AppError> {
        self.client.list_athlete_clubs(access_token).await
    }
}
