// SPDX-License-Identifier: MIT

//! Clubcast: relay Strava club activity into Slack channels.
//!
//! This crate provides a Slack slash-command bot backed by Firestore. It
//! stores one installation record per Slack team, polls the Strava club API
//! on an interval, and posts newly observed activities to each team's
//! incoming webhook.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use db::FirestoreDb;
use services::{StravaService, SyncService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub strava: StravaService,
    pub sync: Arc<SyncService>,
}
