// SPDX-License-Identifier: MIT

//! Slack and Strava OAuth callback routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::Installation;
use crate::services::{SlackOAuthClient, SlackOAuthResponse, StravaClient};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/oauth/slack", get(slack_callback))
        .route("/oauth/strava", get(strava_callback))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: String,
    /// For the Strava flow this carries the Slack team ID
    #[serde(default)]
    state: String,
    #[serde(default)]
    error: Option<String>,
}

/// Slack OAuth callback: exchange the code and store the installation.
///
/// A sign-in response (no webhook granted) is logged and dropped. An
/// installation response replaces the Slack section of any existing record
/// for the team so a reinstall keeps the club subscriptions and ledger.
async fn slack_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "Slack OAuth denied");
        return Ok(Redirect::temporary("/"));
    }

    let oauth = SlackOAuthClient::new(
        state.config.slack_client_id.clone(),
        state.config.slack_client_secret.clone(),
    );

    match oauth.exchange_code(&params.code).await? {
        SlackOAuthResponse::Installation(response) => {
            let slack = response.into_slack_installation();
            let team_id = slack.team_id.clone();

            let installation = match state.db.get_installation(&team_id).await? {
                Some(mut existing) => {
                    existing.slack = slack;
                    existing
                }
                None => Installation::new(slack, &chrono::Utc::now().to_rfc3339()),
            };

            state.db.upsert_installation(&installation).await?;
            tracing::info!(
                team_id = %team_id,
                team_name = %installation.slack.team_name,
                "App installed"
            );
        }
        SlackOAuthResponse::SignIn(response) => {
            tracing::info!(
                team_id = %response.team.id,
                user_id = %response.user.id,
                "Sign-in response, nothing to store"
            );
        }
    }

    Ok(Redirect::temporary("/"))
}

/// Strava OAuth callback: attach the athlete token to an installation.
///
/// The `state` query parameter names the Slack team the connect flow was
/// started for. The token lands as the installation's fallback club token.
async fn strava_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "Strava OAuth denied");
        return Ok(Redirect::temporary("/"));
    }

    let (client_id, client_secret) = match (
        state.config.strava_client_id.as_deref(),
        state.config.strava_client_secret.as_deref(),
    ) {
        (Some(id), Some(secret)) => (id, secret),
        _ => {
            tracing::warn!("Strava OAuth callback hit without client credentials configured");
            return Ok(Redirect::temporary("/"));
        }
    };

    let strava = StravaClient::new();
    let token = strava
        .exchange_code(client_id, client_secret, &params.code)
        .await?;

    tracing::info!(
        athlete_id = token.athlete.id,
        firstname = %token.athlete.firstname,
        "Strava token exchanged"
    );

    match state.db.get_installation(&params.state).await? {
        Some(mut installation) => {
            installation.strava.access_token = Some(token.access_token.clone());
            state.db.upsert_installation(&installation).await?;
            tracing::info!(team_id = %params.state, "Fallback Strava token stored");
        }
        None => {
            tracing::warn!(team_id = %params.state, "No installation for Strava callback state");
        }
    }

    // Log what the token can see, useful when debugging club visibility
    match strava.list_athlete_clubs(&token.access_token).await {
        Ok(clubs) => tracing::info!(count = clubs.len(), "Athlete clubs visible to new token"),
        Err(e) => tracing::warn!(error = %e, "Could not list athlete clubs"),
    }

    Ok(Redirect::temporary("/"))
}
