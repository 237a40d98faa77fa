// SPDX-License-Identifier: MIT

//! HTTP route handlers.

pub mod oauth;
pub mod slash;

use crate::AppState;
use axum::response::Html;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Minimal landing page with the Slack install link.
async fn root_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let install_url = format!(
        "https://slack.com/oauth/authorize?client_id={}&scope=commands,incoming-webhook&redirect_uri={}/oauth/slack",
        state.config.slack_client_id, state.config.root_url
    );

    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Clubcast</title></head>\n<body>\n\
         <h1>Clubcast</h1>\n\
         <p>Relay Strava club activity into a Slack channel.</p>\n\
         <p><a href=\"{}\">Add to Slack</a></p>\n\
         </body>\n</html>\n",
        install_url
    ))
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_page))
        .route("/health", get(health_check))
        .merge(slash::routes())
        .merge(oauth::routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
