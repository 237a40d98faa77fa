// SPDX-License-Identifier: MIT

//! Formatting of Strava records into Slack message attachments.

use crate::models::{ClubActivity, ClubWithMembers, MessageAttachment};

const METERS_TO_MILES: f64 = 0.000_621_371;
const MPS_TO_KMH: f64 = 3.6;
const KMH_TO_MPH: f64 = 0.621_371;

/// Convert meters to miles, rounded for display.
pub fn meters_to_miles(meters: f64) -> String {
    format!("{:.2}", meters * METERS_TO_MILES)
}

/// Convert meters per second into a "minutes:seconds per mile" pace string.
pub fn pace_string(meters_per_second: f64) -> String {
    if meters_per_second <= 0.0 {
        return "0:00".to_string();
    }

    let miles_per_hour = meters_per_second * MPS_TO_KMH * KMH_TO_MPH;
    let minutes_per_mile = 60.0 / miles_per_hour;

    let minutes = minutes_per_mile.floor();
    let seconds = ((minutes_per_mile - minutes) * 60.0).round() as u64;

    // Rounding seconds can carry into the next minute
    if seconds >= 60 {
        return format!("{}:00", minutes as u64 + 1);
    }

    format!("{}:{:02}", minutes as u64, seconds)
}

/// Emoji for a sport type, falling back to the raw name.
pub fn sport_emoji(sport: &str) -> &str {
    match sport {
        "Ride" => ":bike:",
        "Run" => ":runner:",
        "Swim" => ":swimmer:",
        "Hike" => ":mountain:",
        "Walk" => ":walking:",
        other => other,
    }
}

/// One attachment per activity, linking athlete and activity on Strava.
pub fn format_activities(activities: &[ClubActivity]) -> Vec<MessageAttachment> {
    activities
        .iter()
        .map(|a| {
            let achievements = if a.achievement_count > 0 {
                format!(":trophy: {} achievements!", a.achievement_count)
            } else {
                String::new()
            };

            let title = format!(
                "{} {} miles at a {} pace. {}",
                sport_emoji(&a.sport),
                meters_to_miles(a.distance),
                pace_string(a.average_speed),
                achievements
            );

            let author_link = a
                .athlete
                .username
                .as_ref()
                .map(|u| format!("https://www.strava.com/athletes/{}", u));
            let title_link = a
                .id
                .map(|id| format!("https://www.strava.com/activities/{}", id));

            MessageAttachment {
                fallback: Some(format!("{}: {}", a.athlete_name(), title.trim())),
                author_name: Some(a.athlete_name()),
                author_link,
                author_icon: a.athlete.profile.clone(),
                title: Some(title.trim_end().to_string()),
                title_link,
                ..Default::default()
            }
        })
        .collect()
}

/// One attachment per club with its member roster.
pub fn format_clubs_with_members(clubs: &[ClubWithMembers]) -> Vec<MessageAttachment> {
    clubs
        .iter()
        .map(|entry| {
            let roster = entry
                .members
                .iter()
                .map(|member| {
                    let name = format!("{} {}", member.firstname, member.lastname);
                    match &member.city {
                        Some(city) => format!("{} ({})\n", name, city),
                        None => format!("{}\n", name),
                    }
                })
                .collect::<String>();

            let city = entry.club.city.as_deref().unwrap_or("");
            MessageAttachment {
                fallback: Some(entry.club.name.clone()),
                author_name: Some(format!("{}, {}", entry.club.name, city)),
                author_link: Some(format!("https://www.strava.com/clubs/{}", entry.club.id)),
                author_icon: entry.club.profile_medium.clone(),
                text: Some(roster),
                ..Default::default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityAthlete;

    fn activity() -> ClubActivity {
        ClubActivity {
            id: Some(42),
            athlete: ActivityAthlete {
                id: Some(7),
                username: Some("jdoe".to_string()),
                firstname: "Jane".to_string(),
                lastname: "Doe".to_string(),
                profile: Some("https://example.com/jane.jpg".to_string()),
            },
            name: "Evening Ride".to_string(),
            distance: 16093.4, // ~10 miles
            moving_time: 3600,
            elapsed_time: 3700,
            total_elevation_gain: 120.0,
            sport: "Ride".to_string(),
            start_date: "2024-03-01T18:00:00Z".to_string(),
            average_speed: 4.47, // ~10 mph, 6 min/mi
            achievement_count: 3,
        }
    }

    #[test]
    fn test_meters_to_miles() {
        assert_eq!(meters_to_miles(1609.34), "1.00");
        assert_eq!(meters_to_miles(0.0), "0.00");
    }

    #[test]
    fn test_pace_string() {
        // 4.4704 m/s is exactly 10 mph, a 6:00/mi pace
        assert_eq!(pace_string(4.4704), "6:00");
        assert_eq!(pace_string(0.0), "0:00");
    }

    #[test]
    fn test_format_activities() {
        let attachments = format_activities(&[activity()]);
        assert_eq!(attachments.len(), 1);

        let a = &attachments[0];
        assert_eq!(a.author_name.as_deref(), Some("Jane Doe"));
        assert_eq!(
            a.author_link.as_deref(),
            Some("https://www.strava.com/athletes/jdoe")
        );
        assert_eq!(
            a.title_link.as_deref(),
            Some("https://www.strava.com/activities/42")
        );

        let title = a.title.as_deref().unwrap();
        assert!(title.starts_with(":bike:"));
        assert!(title.contains("10.00 miles"));
        assert!(title.contains(":trophy: 3 achievements!"));
    }

    #[test]
    fn test_no_achievements_no_trophy() {
        let mut plain = activity();
        plain.achievement_count = 0;
        let attachments = format_activities(&[plain]);
        assert!(!attachments[0].title.as_deref().unwrap().contains(":trophy:"));
    }
}
