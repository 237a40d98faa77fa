// SPDX-License-Identifier: MIT

//! Clubcast server
//!
//! Slack slash-command bot that relays Strava club activity into Slack
//! channels via incoming webhooks.

use clubcast::{
    config::Config,
    db::FirestoreDb,
    services::{SlackNotifier, StravaClient, StravaService, SyncScheduler, SyncService},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Clubcast");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    let strava = StravaService::new(StravaClient::new(), config.strava_access_token.clone());

    let sync = Arc::new(SyncService::new(
        db.clone(),
        strava.clone(),
        SlackNotifier::new(),
    ));

    // The scheduler owns its background task and stops it on drop, so it
    // has to outlive the server loop below.
    let mut scheduler = SyncScheduler::new(sync.clone());
    if config.disable_check {
        tracing::info!("Periodic checks disabled by configuration");
    } else {
        let interval = Duration::from_secs(config.check_interval_minutes * 60);
        tracing::info!(
            interval_minutes = config.check_interval_minutes,
            "Starting periodic check scheduler"
        );
        scheduler.start(interval);
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        strava,
        sync,
    });

    // Build router
    let app = clubcast::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;

    scheduler.stop();
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clubcast=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
