// SPDX-License-Identifier: MIT

//! The `debug` command: process info, check log, store connectivity.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::CommandReply;
use crate::services::sync::CheckEntry;
use crate::AppState;

/// Human-readable duration since `from`, e.g. "2d 3h 14m".
fn humanize_uptime(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total_minutes = (now - from).num_minutes().max(0);
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// One line per pass: "03/01 10:15 (`1709288100000`) - 2 activities found."
fn format_check_log(entries: &[CheckEntry]) -> String {
    if entries.is_empty() {
        return "No checks recorded yet.".to_string();
    }

    entries
        .iter()
        .map(|entry| {
            format!(
                "{} (`{}`) - {} activities found.",
                entry.at.format("%m/%d %H:%M"),
                entry.at.timestamp_millis(),
                entry.new_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Handle a debug request.
pub async fn handle(state: &Arc<AppState>) -> CommandReply {
    let entries = state.sync.check_log();
    let uptime = humanize_uptime(state.sync.started_at(), Utc::now());

    let text = format!(
        "*:hammer_and_wrench: Debug Information*\n\
         \n\
         _Process Information_\n\
         Up for {} | clubcast v{}\n\
         \n\
         _Last {} Checks_\n\
         {}\n\
         \n\
         _Database_\n\
         Connected: {}",
        uptime,
        env!("CARGO_PKG_VERSION"),
        entries.len(),
        format_check_log(&entries),
        state.db.is_connected()
    );

    CommandReply::ephemeral(text)
}
