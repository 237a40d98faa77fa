// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. For local development a `.env` file
//! is honored via dotenvy.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// GCP project ID for Firestore
    pub gcp_project_id: String,
    /// Public URL of this service, used for OAuth redirects and the root page
    pub root_url: String,

    /// Slack OAuth client ID
    pub slack_client_id: String,
    /// Slack OAuth client secret
    pub slack_client_secret: String,
    /// The slash command's invocation keyword (e.g. "/clubs")
    pub slash_command: String,

    /// Fallback Strava access token, used for clubs without their own token
    pub strava_access_token: String,
    /// Strava OAuth client ID (only needed for the Strava connect flow)
    pub strava_client_id: Option<String>,
    /// Strava OAuth client secret
    pub strava_client_secret: Option<String>,

    /// Minutes between reconciliation passes
    pub check_interval_minutes: u64,
    /// Disable the periodic reconciliation loop entirely
    pub disable_check: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            root_url: env::var("ROOT_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),

            slack_client_id: env::var("SLACK_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("SLACK_CLIENT_ID"))?,
            slack_client_secret: env::var("SLACK_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SLACK_CLIENT_SECRET"))?,
            slash_command: env::var("SLASH_COMMAND").unwrap_or_else(|_| "/clubs".to_string()),

            strava_access_token: env::var("STRAVA_ACCESS_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_ACCESS_TOKEN"))?,
            strava_client_id: env::var("STRAVA_CLIENT_ID").ok(),
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .ok()
                .map(|v| v.trim().to_string()),

            check_interval_minutes: env::var("CHECK_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            disable_check: env::var("DISABLE_CHECK")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            gcp_project_id: "test-project".to_string(),
            root_url: "http://localhost:8080".to_string(),
            slack_client_id: "test_client_id".to_string(),
            slack_client_secret: "test_secret".to_string(),
            slash_command: "/clubs".to_string(),
            strava_access_token: "test_strava_token".to_string(),
            strava_client_id: None,
            strava_client_secret: None,
            check_interval_minutes: 15,
            disable_check: true,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
