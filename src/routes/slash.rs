// SPDX-License-Identifier: MIT

//! Slack slash-command endpoint.

use axum::{extract::State, routing::post, Form, Json, Router};
use std::sync::Arc;

use crate::commands;
use crate::models::{CommandReply, SlashCommandPayload};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/slack/command", post(handle_command))
}

/// Receive a form-encoded slash-command payload, dispatch it, and answer
/// with the JSON reply body Slack renders in-channel or ephemerally.
async fn handle_command(
    State(state): State<Arc<AppState>>,
    Form(payload): Form<SlashCommandPayload>,
) -> Json<CommandReply> {
    tracing::info!(
        team_id = %payload.team_id,
        user_id = %payload.user_id,
        text = %payload.text,
        "Slash command received"
    );

    let reply = commands::dispatch(&state, &payload).await;
    Json(reply)
}
