// SPDX-License-Identifier: MIT

//! Slack message and slash-command payload models.

use serde::{Deserialize, Serialize};

/// Slash-command payload posted by Slack (form-encoded).
#[derive(Debug, Clone, Deserialize)]
pub struct SlashCommandPayload {
    #[serde(default)]
    pub token: String,
    pub team_id: String,
    #[serde(default)]
    pub team_domain: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub response_url: String,
}

/// Visibility of a slash-command response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Visible only to the invoking user
    Ephemeral,
    /// Posted to the channel
    InChannel,
}

/// Response body for a slash command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandReply {
    pub text: String,
    pub response_type: ResponseType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<MessageAttachment>,
}

impl CommandReply {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            response_type: ResponseType::Ephemeral,
            attachments: Vec::new(),
        }
    }

    pub fn in_channel(text: impl Into<String>, attachments: Vec<MessageAttachment>) -> Self {
        Self {
            text: text.into(),
            response_type: ResponseType::InChannel,
            attachments,
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<MessageAttachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Message body posted to an incoming webhook.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WebhookMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub attachments: Vec<MessageAttachment>,
}

/// A classic Slack message attachment.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageAttachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fields: Vec<AttachmentField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
}

/// A short key/value field inside an attachment.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_serialization() {
        let reply = CommandReply::ephemeral("hello");
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["text"], "hello");
        assert_eq!(json["response_type"], "ephemeral");
        // Empty attachments are omitted entirely
        assert!(json.get("attachments").is_none());
    }

    #[test]
    fn test_in_channel_reply() {
        let reply = CommandReply::in_channel(
            "activities",
            vec![MessageAttachment {
                title: Some("5 miles".to_string()),
                ..Default::default()
            }],
        );
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["response_type"], "in_channel");
        assert_eq!(json["attachments"][0]["title"], "5 miles");
    }
}
