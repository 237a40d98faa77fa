// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod scheduler;
pub mod slack;
pub mod strava;
pub mod sync;

pub use scheduler::SyncScheduler;
pub use slack::{SlackNotifier, SlackOAuthClient, SlackOAuthResponse};
pub use strava::{StravaClient, StravaService};
pub use sync::SyncService;
