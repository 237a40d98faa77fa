// SPDX-License-Identifier: MIT

//! Strava club and member models.

use serde::{Deserialize, Serialize};

/// Club details from the Strava API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaClub {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile_medium: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub sport_type: Option<String>,
}

/// Club member summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubMember {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub city: Option<String>,
}

/// A club paired with its member roster, for the members command.
#[derive(Debug, Clone)]
pub struct ClubWithMembers {
    pub club: StravaClub,
    pub members: Vec<ClubMember>,
}
