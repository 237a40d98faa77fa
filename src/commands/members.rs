// SPDX-License-Identifier: MIT

//! Member listing for the watched clubs.

use std::sync::Arc;

use crate::format::format_clubs_with_members;
use crate::models::CommandReply;
use crate::AppState;

/// Does the text ask for the member roster?
pub fn is_members_request(text: &str) -> bool {
    let text = text.to_lowercase();
    text.contains("members") || text.contains("athletes")
}

/// Handle a members/athletes request: one attachment per watched club.
pub async fn handle(state: &Arc<AppState>, team_id: &str) -> CommandReply {
    let installation = match state.db.get_installation(team_id).await {
        Ok(Some(installation)) => installation,
        Ok(None) | Err(_) => {
            tracing::warn!(team_id, "Failed to load installation for members command");
            return CommandReply::ephemeral(
                "We tried to get members, but encountered an internal database error :sadness:",
            );
        }
    };

    let clubs = state.strava.get_members(&installation.strava).await;
    let attachments = format_clubs_with_members(&clubs);

    let text = if attachments.is_empty() {
        "You requested athletes, but we could not find any clubs".to_string()
    } else {
        ":family: *Athletes*".to_string()
    };

    CommandReply::ephemeral(text).with_attachments(attachments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_members_request() {
        assert!(is_members_request("members"));
        assert!(is_members_request("show me the athletes"));
        assert!(is_members_request("MEMBERS"));
        assert!(!is_members_request("recent 5"));
    }
}
