// SPDX-License-Identifier: MIT

//! Strava club activity as returned by the club activities endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary activity from a club's activity feed.
///
/// Strava occasionally returns activities without an `id` (older API
/// versions stripped it from club feeds), so the field is optional and
/// deduplication falls back to a synthetic identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubActivity {
    #[serde(default)]
    pub id: Option<u64>,
    pub athlete: ActivityAthlete,
    pub name: String,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    /// Moving time in seconds
    #[serde(default)]
    pub moving_time: u64,
    /// Elapsed time in seconds
    #[serde(default)]
    pub elapsed_time: u64,
    #[serde(default)]
    pub total_elevation_gain: f64,
    /// Sport type (Ride, Run, Swim, ...)
    #[serde(rename = "type")]
    pub sport: String,
    /// Start date/time (ISO 8601)
    #[serde(default)]
    pub start_date: String,
    /// Average speed in meters per second
    #[serde(default)]
    pub average_speed: f64,
    #[serde(default)]
    pub achievement_count: u32,
}

/// Athlete summary embedded in a club activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityAthlete {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    /// Profile picture URL
    #[serde(default)]
    pub profile: Option<String>,
}

impl ClubActivity {
    /// Identifier used for deduplication.
    ///
    /// Falls back to elapsed time + moving time + distance when the record
    /// has no real ID. Collision-prone, but the ledger is best-effort, not
    /// a correctness-critical key.
    pub fn dedup_id(&self) -> u64 {
        match self.id {
            Some(id) => id,
            None => ((self.elapsed_time + self.moving_time) as f64 + self.distance) as u64,
        }
    }

    /// Parsed start time, if the record carries a valid one.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.start_date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn athlete_name(&self) -> String {
        format!("{} {}", self.athlete.firstname, self.athlete.lastname)
    }
}
