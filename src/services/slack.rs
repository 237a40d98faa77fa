// SPDX-License-Identifier: MIT

//! Slack outbound client: incoming-webhook posting and OAuth code exchange.

use serde::Deserialize;

use crate::error::AppError;
use crate::models::installation::{IncomingWebhook, SlackInstallation};
use crate::models::{MessageAttachment, WebhookMessage};

/// Posts messages to team incoming webhooks.
#[derive(Clone)]
pub struct SlackNotifier {
    http: reqwest::Client,
}

impl SlackNotifier {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// POST attachments to an incoming webhook URL.
    pub async fn post_attachments(
        &self,
        webhook_url: &str,
        attachments: Vec<MessageAttachment>,
    ) -> Result<(), AppError> {
        let message = WebhookMessage {
            text: None,
            attachments,
        };

        let response = self
            .http
            .post(webhook_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| AppError::SlackApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SlackApi(format!("HTTP {}: {}", status, body)));
        }

        Ok(())
    }
}

impl Default for SlackNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Slack OAuth access response, distinguished at the parse boundary.
///
/// Slack returns two shapes from `oauth.access`: an app installation
/// (carries `incoming_webhook`) and a plain sign-in. Untagged serde tries
/// the installation shape first, so the presence of `incoming_webhook`
/// decides the variant once, here, instead of being duck-typed downstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SlackOAuthResponse {
    Installation(InstallationResponse),
    SignIn(SignInResponse),
}

/// OAuth response for an app installation.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationResponse {
    pub access_token: String,
    #[serde(default)]
    pub scope: String,
    pub user_id: String,
    pub team_name: String,
    pub team_id: String,
    pub incoming_webhook: OAuthIncomingWebhook,
}

/// Incoming-webhook block of an installation response.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthIncomingWebhook {
    pub channel: String,
    pub channel_id: String,
    pub configuration_url: String,
    pub url: String,
}

/// OAuth response for a user sign-in (no webhook granted).
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    #[serde(default)]
    pub access_token: String,
    pub user: SignInUser,
    pub team: SignInTeam,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInTeam {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl InstallationResponse {
    /// Convert into the Slack section of an installation record.
    pub fn into_slack_installation(self) -> SlackInstallation {
        SlackInstallation {
            access_token: self.access_token,
            user_id: self.user_id,
            team_id: self.team_id,
            team_name: self.team_name,
            incoming_webhook: Some(IncomingWebhook {
                channel: self.incoming_webhook.channel,
                channel_id: self.incoming_webhook.channel_id,
                configuration_url: self.incoming_webhook.configuration_url,
                url: self.incoming_webhook.url,
            }),
        }
    }
}

/// Slack OAuth client for the code exchange.
#[derive(Clone)]
pub struct SlackOAuthClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl SlackOAuthClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://slack.com/api".to_string(),
            client_id,
            client_secret,
        }
    }

    /// Exchange an authorization code at `oauth.access`.
    pub async fn exchange_code(&self, code: &str) -> Result<SlackOAuthResponse, AppError> {
        let url = format!("{}/oauth.access", self.base_url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| AppError::SlackApi(format!("OAuth exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::SlackApi(format!(
                "OAuth exchange failed with status {}",
                status
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::SlackApi(format!("Failed to parse OAuth response: {}", e)))?;

        // Slack reports failures in-band with ok=false
        if !raw.get("ok").and_then(|v| v.as_bool()).unwrap_or(false) {
            let reason = raw
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            return Err(AppError::SlackApi(format!("OAuth rejected: {}", reason)));
        }

        serde_json::from_value(raw)
            .map_err(|e| AppError::SlackApi(format!("Unexpected OAuth response shape: {}", e)))
    }
}
