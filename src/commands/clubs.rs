// SPDX-License-Identifier: MIT

//! Club subscription management: add, remove, list.

use std::sync::Arc;

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{CommandReply, Installation};
use crate::AppState;

static ADD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)clubs (add|watch|include) (\d{1,10})").expect("Invalid add regex")
});
static REMOVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)clubs (remove|unwatch|exclude) (\d{1,10})").expect("Invalid remove regex")
});

/// Pull the club ID out of a matched add/remove command.
fn parse_club_id(regex: &Regex, input: &str) -> Option<u64> {
    regex
        .captures(input)
        .and_then(|caps| caps.get(2))
        .and_then(|id| id.as_str().parse().ok())
}

/// Add a club to the installation. Pure mutation; returns the reply text
/// and whether the record changed.
fn apply_add(installation: &mut Installation, club_id: u64) -> (String, bool) {
    let previous = installation.club_list();

    if !installation.add_club(club_id) {
        return (
            format!(":eyes: We're already watching club {}!", club_id),
            false,
        );
    }

    let addition = if previous.is_empty() {
        ".".to_string()
    } else {
        format!(", in addition to {}.", previous)
    };

    (
        format!(
            "Got it! We've added {} to the list of Strava clubs to watch{}",
            club_id, addition
        ),
        true,
    )
}

/// Remove a club from the installation. Pure mutation; returns the reply
/// text and whether the record changed.
fn apply_remove(installation: &mut Installation, club_id: u64) -> (String, bool) {
    if !installation.remove_club(club_id) {
        return (
            format!(
                ":no_good: We weren't watching club {}, so we're all good!",
                club_id
            ),
            false,
        );
    }

    let remainder = if installation.strava.clubs.is_empty() {
        "We're now no longer watching any clubs though.".to_string()
    } else {
        format!("We're still watching {}.", installation.club_list())
    };

    (
        format!(
            "Got it! We've removed {} from the list of Strava clubs to watch. {}",
            club_id, remainder
        ),
        true,
    )
}

fn list_reply(installation: &Installation, slash_command: &str) -> String {
    if installation.strava.clubs.is_empty() {
        format!(
            ":no_good: We're not watching any clubs yet. Add one with `{} clubs add`!",
            slash_command
        )
    } else {
        format!(
            ":eyes: We're currently watching the following Strava clubs: {}",
            installation.club_list()
        )
    }
}

/// Handle a slash command beginning with `clubs`.
pub async fn handle(state: &Arc<AppState>, team_id: &str, text: &str) -> CommandReply {
    let mut installation = match state.db.get_installation(team_id).await {
        Ok(Some(installation)) => installation,
        Ok(None) => {
            tracing::warn!(team_id, "No installation found for clubs command");
            return CommandReply::ephemeral(
                "We failed to get information about your installation",
            );
        }
        Err(e) => {
            tracing::warn!(team_id, error = %e, "Failed to load installation");
            return CommandReply::ephemeral(
                "We failed to get information about your installation",
            );
        }
    };

    let (message, changed, op) = if ADD_REGEX.is_match(text) {
        match parse_club_id(&ADD_REGEX, text) {
            Some(id) => {
                let (message, changed) = apply_add(&mut installation, id);
                (message, changed, "add")
            }
            None => (
                ":no_good: We did not understand the club you gave us.".to_string(),
                false,
                "add",
            ),
        }
    } else if REMOVE_REGEX.is_match(text) {
        match parse_club_id(&REMOVE_REGEX, text) {
            Some(id) => {
                let (message, changed) = apply_remove(&mut installation, id);
                (message, changed, "remove")
            }
            None => (
                ":no_good: We did not understand the club you gave us.".to_string(),
                false,
                "remove",
            ),
        }
    } else {
        (
            list_reply(&installation, &state.config.slash_command),
            false,
            "list",
        )
    };

    if changed {
        if let Err(e) = state.db.upsert_installation(&installation).await {
            tracing::warn!(team_id, error = %e, "Failed to persist club change");
            return CommandReply::ephemeral(format!(
                "We tried to {} the club, but encountered an internal database error :sadness:",
                op
            ));
        }
    }

    CommandReply::ephemeral(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::installation::SlackInstallation;

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

    #[test]
    fn test_add_parses_all_verbs() {
        for text in ["clubs add 336978", "clubs watch 336978", "clubs include 336978"] {
            assert!(ADD_REGEX.is_match(text), "{} should match", text);
            assert_eq!(parse_club_id(&ADD_REGEX, text), Some(336978));
        }
        assert!(!ADD_REGEX.is_match("clubs add banana"));
    }

    #[test]
    fn test_add_club_end_to_end() {
        let mut inst = installation();

        let (message, changed) = apply_add(&mut inst, 336978);
        assert!(changed);
        assert!(message.contains("336978"));

        let ids: Vec<u64> = inst.strava.clubs.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![336978]);
    }

    #[test]
    fn test_second_add_reports_already_watching() {
        let mut inst = installation();
        apply_add(&mut inst, 336978);

        let (message, changed) = apply_add(&mut inst, 336978);
        assert!(!changed);
        assert!(message.contains("already watching"));
        assert_eq!(inst.strava.clubs.len(), 1);
    }

    #[test]
    fn test_add_mentions_existing_clubs() {
        let mut inst = installation();
        apply_add(&mut inst, 111);

        let (message, _) = apply_add(&mut inst, 222);
        assert!(message.contains("in addition to 111"));
    }

    #[test]
    fn test_remove_unwatched_reports_not_watching() {
        let mut inst = installation();
        apply_add(&mut inst, 111);

        let (message, changed) = apply_remove(&mut inst, 336978);
        assert!(!changed);
        assert!(message.contains("weren't watching"));
        assert_eq!(inst.strava.clubs.len(), 1);
    }

    #[test]
    fn test_remove_last_club() {
        let mut inst = installation();
        apply_add(&mut inst, 111);

        let (message, changed) = apply_remove(&mut inst, 111);
        assert!(changed);
        assert!(message.contains("no longer watching any clubs"));
        assert!(inst.strava.clubs.is_empty());
    }

    #[test]
    fn test_list_replies() {
        let mut inst = installation();
        assert!(list_reply(&inst, "/clubs").contains("not watching any clubs"));

        apply_add(&mut inst, 111);
        apply_add(&mut inst, 222);
        assert!(list_reply(&inst, "/clubs").contains("111, 222"));
    }
}
