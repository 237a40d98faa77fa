// SPDX-License-Identifier: MIT

//! The `recent [n]` and `recent since <date>` commands.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::commands::help;
use crate::format::format_activities;
use crate::models::{ClubActivity, CommandReply, MessageAttachment};
use crate::AppState;

/// Default number of activities for a bare `recent`.
const DEFAULT_COUNT: usize = 10;
/// Upper bound on activities shown or fetched per club.
const MAX_COUNT: usize = 50;
/// Attachment cap for `recent since` replies.
const SINCE_CAP: usize = 25;

static RECENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)recent( \d+)?$").expect("Invalid recent regex"));
static RECENT_SINCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)recent since (.*)$").expect("Invalid recent-since regex"));
static UNIX_MILLIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{9,13}$").expect("Invalid millis regex"));

/// Does the text ask for `recent [n]`? Returns the count if it does.
pub fn parse_recent(input: &str) -> Option<usize> {
    let caps = RECENT.captures(input.trim())?;
    let count = caps
        .get(1)
        .and_then(|m| m.as_str().trim().parse().ok())
        .unwrap_or(DEFAULT_COUNT);
    Some(count.min(MAX_COUNT))
}

/// Does the text ask for `recent since <date>`? Returns the cutoff.
pub fn parse_recent_since(input: &str) -> Option<DateTime<Utc>> {
    let caps = RECENT_SINCE.captures(input.trim())?;
    find_date_time(caps.get(1)?.as_str())
}

/// Find a date/time in free text: unix millis, full ISO 8601, a naive
/// datetime, or a plain date.
pub fn find_date_time(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if UNIX_MILLIS.is_match(input) {
        let millis: i64 = input.parse().ok()?;
        return DateTime::from_timestamp_millis(millis);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

/// Attachments for a `recent [n]` reply, capped at `count`.
fn recent_attachments(activities: &[ClubActivity], count: usize) -> Vec<MessageAttachment> {
    let mut attachments = format_activities(activities);
    attachments.truncate(count);
    attachments
}

/// Handle a slash command containing `recent`.
pub async fn handle(state: &Arc<AppState>, team_id: &str, text: &str) -> CommandReply {
    let installation = match state.db.get_installation(team_id).await {
        Ok(Some(installation)) => installation,
        Ok(None) | Err(_) => {
            tracing::warn!(team_id, "Failed to load installation for recent command");
            return CommandReply::ephemeral(
                "We failed to get information about your installation",
            );
        }
    };

    if installation.strava.clubs.is_empty() {
        return help::no_clubs(&state.config.slash_command);
    }

    if let Some(count) = parse_recent(text) {
        let activities = state
            .strava
            .get_activities(&installation.strava, MAX_COUNT as u32)
            .await;

        return CommandReply::in_channel(
            format!(":sports_medal: *The last {} activities:*", count),
            recent_attachments(&activities, count),
        );
    }

    if let Some(since) = parse_recent_since(text) {
        let activities = state
            .strava
            .get_activities_since(&installation.strava, since)
            .await;

        return CommandReply::in_channel(
            format!(
                ":sports_medal: *The last activities since {}:*",
                since.format("%Y-%m-%d %H:%M UTC")
            ),
            recent_attachments(&activities, SINCE_CAP),
        );
    }

    help::did_not_work(&state.config.slash_command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityAthlete;

    #[test]
    fn test_parse_recent() {
        assert_eq!(parse_recent("recent"), Some(DEFAULT_COUNT));
        assert_eq!(parse_recent("  recent 5"), Some(5));
        assert_eq!(parse_recent("recent 200"), Some(MAX_COUNT));
        assert_eq!(parse_recent("debug"), None);
        // "recent since" is a different command
        assert_eq!(parse_recent("recent since 2018-01-01"), None);
    }

    #[test]
    fn test_parse_recent_since() {
        let since = parse_recent_since("  recent since 2018-01-01 ").expect("should parse");
        assert_eq!(since.to_rfc3339(), "2018-01-01T00:00:00+00:00");

        assert!(parse_recent_since("recent 2018-01-01").is_none());
    }

    #[test]
    fn test_find_date_time_millis() {
        let dt = find_date_time(" 1519821037147 ").expect("should parse");
        assert_eq!(dt.timestamp_millis(), 1519821037147);
    }

    #[test]
    fn test_find_date_time_iso() {
        let dt = find_date_time("2018-02-28T14:30:37").expect("should parse");
        assert_eq!(dt.to_rfc3339(), "2018-02-28T14:30:37+00:00");

        let with_zone = find_date_time("2018-02-28T14:30:37Z").expect("should parse");
        assert_eq!(with_zone, dt);
    }

    #[test]
    fn test_find_date_time_garbage() {
        assert!(find_date_time("sdfsdfsdfsdf").is_none());
    }

    #[test]
    fn test_recent_attachments_capped() {
        let activities: Vec<ClubActivity> = (0..10)
            .map(|i| ClubActivity {
                id: Some(i),
                athlete: ActivityAthlete {
                    id: None,
                    username: None,
                    firstname: "A".to_string(),
                    lastname: "B".to_string(),
                    profile: None,
                },
                name: format!("Activity {}", i),
                distance: 1000.0,
                moving_time: 600,
                elapsed_time: 700,
                total_elevation_gain: 0.0,
                sport: "Run".to_string(),
                start_date: "2024-03-01T10:00:00Z".to_string(),
                average_speed: 2.0,
                achievement_count: 0,
            })
            .collect();

        assert_eq!(recent_attachments(&activities, 5).len(), 5);
        assert_eq!(recent_attachments(&activities, 50).len(), 10);
    }
}
