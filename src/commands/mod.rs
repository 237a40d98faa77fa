// SPDX-License-Identifier: MIT

//! Slash-command parsing and dispatch.
//!
//! Routing is priority-ordered, first match wins: help intent, `clubs`
//! prefix, `debug`, `recent`, `check now`, member listing, fallback.

pub mod clubs;
pub mod debug;
pub mod help;
pub mod members;
pub mod recent;

use std::sync::Arc;

use crate::models::{CommandReply, SlashCommandPayload};
use crate::AppState;

/// Where a slash command's text routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Clubs,
    Debug,
    Recent,
    CheckNow,
    Members,
    Unknown,
}

impl Command {
    /// Classify command text. First match wins; handlers re-parse their
    /// own arguments.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if help::is_help_request(text) {
            return Command::Help;
        }
        if text.starts_with("clubs") {
            return Command::Clubs;
        }
        if text.contains("debug") {
            return Command::Debug;
        }
        if text.contains("recent") {
            return Command::Recent;
        }
        if text.contains("check now") {
            return Command::CheckNow;
        }
        if members::is_members_request(text) {
            return Command::Members;
        }

        Command::Unknown
    }
}

/// Route a slash-command payload to its handler and produce the reply.
pub async fn dispatch(state: &Arc<AppState>, payload: &SlashCommandPayload) -> CommandReply {
    let text = payload.text.trim();

    tracing::debug!(
        team_id = %payload.team_id,
        text = %text,
        "Dispatching slash command"
    );

    match Command::parse(text) {
        Command::Help => help::help_reply(&state.config.slash_command),
        Command::Clubs => clubs::handle(state, &payload.team_id, text).await,
        Command::Debug => debug::handle(state).await,
        Command::Recent => recent::handle(state, &payload.team_id, text).await,
        Command::CheckNow => handle_check_now(state),
        Command::Members => members::handle(state, &payload.team_id).await,
        Command::Unknown => help::did_not_work(&state.config.slash_command),
    }
}

/// Kick an out-of-band reconciliation pass and reply immediately.
fn handle_check_now(state: &Arc<AppState>) -> CommandReply {
    let sync = state.sync.clone();
    tokio::spawn(async move {
        sync.run_all().await;
    });

    CommandReply::ephemeral(":horse_racing: Got it, checking now!")
}
