// SPDX-License-Identifier: MIT

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// One document per Slack team, keyed by team ID.
    pub const INSTALLATIONS: &str = "installations";
}
