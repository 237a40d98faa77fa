// SPDX-License-Identifier: MIT

//! Help detection and the canned help / fallback replies.

use crate::models::CommandReply;

/// Emoji that count as a cry for help.
const HELP_EMOJI: [&str; 5] = ["🚑", "👩‍🚒", "🚨", "👨‍🚒", "🚒"];

/// Empty text, a "help" mention, a trailing question mark, or a
/// first-responder emoji all ask for help.
pub fn is_help_request(text: &str) -> bool {
    let text = text.trim();

    text.is_empty()
        || text.to_lowercase().contains("help")
        || text.ends_with('?')
        || HELP_EMOJI.iter().any(|e| text.contains(e))
}

fn help_text(slash_command: &str) -> String {
    format!(
        "*:runner: Recent activities*\n\
         To just get the recent activities:\n\
         > `{cmd} recent`\n\
         To get the last 15 activities (max 50):\n\
         > `{cmd} recent 15`\n\
         To get activities since February 3rd 2018:\n\
         > `{cmd} recent since 2018-02-03`\n\
         :point_up: If you're a date nerd, this will support all ISO 8601 formats.\n\
         \n\
         *:busts_in_silhouette: Clubs*\n\
         To list the Strava clubs we're watching:\n\
         > `{cmd} clubs`\n\
         To watch a club:\n\
         > `{cmd} clubs add 336978`\n\
         To stop watching a club:\n\
         > `{cmd} clubs remove 336978`\n\
         \n\
         *:family: Members*\n\
         To get members for our clubs:\n\
         > `{cmd} members` or `{cmd} athletes`\n\
         \n\
         *:robot_face: Operations*\n\
         To check for new activities now:\n\
         > `{cmd} check now`\n\
         To see debug output:\n\
         > `{cmd} debug`\n\
         To see this help output:\n\
         > `{cmd} help`",
        cmd = slash_command
    )
}

/// The full help reply.
pub fn help_reply(slash_command: &str) -> CommandReply {
    CommandReply::ephemeral(format!(
        ":sports_medal: It seems like you asked for help :ambulance:. Here's how to do things:\n\n{}",
        help_text(slash_command)
    ))
}

/// Fallback for text nothing matched.
pub fn did_not_work(slash_command: &str) -> CommandReply {
    CommandReply::ephemeral(format!(
        ":sadness: Hm, that did not work. Type `{} help` for help.",
        slash_command
    ))
}

/// Reply for commands that need at least one watched club.
pub fn no_clubs(slash_command: &str) -> CommandReply {
    CommandReply::ephemeral(format!(
        ":no_good: We're not watching any clubs yet. Add one with `{} clubs add`!",
        slash_command
    ))
}
