// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod activity;
pub mod club;
pub mod installation;
pub mod slack;

pub use activity::{ActivityAthlete, ClubActivity};
pub use club::{ClubMember, ClubWithMembers, StravaClub};
pub use installation::{ClubSubscription, IncomingWebhook, Installation, KnownActivity};
pub use slack::{
    AttachmentField, CommandReply, MessageAttachment, ResponseType, SlashCommandPayload,
    WebhookMessage,
};
