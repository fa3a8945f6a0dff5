//! Flat persisted-record types for the save file.
//!
//! The save file is a single JSON document overwritten wholesale on every
//! save. No object references are persisted -- only primitive identifiers
//! and coordinates. All runtime relationships (leader pointers, follower
//! slots, phase subscriptions) are reconstructed from this flat form on
//! load by replaying the release rules.
//!
//! Field names are fixed by the on-disk format and mapped via serde
//! renames; the Rust side keeps `snake_case`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ids::SessionId;

/// One persisted token: position, identity strings, and emotion index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionRecord {
    /// World position at save time.
    pub position: Vec3,
    /// Display name of the token (derived from the emotion kind).
    pub name: String,
    /// The session this token was released into.
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    /// The emotion label, stored explicitly at release time.
    pub label: String,
    /// The user's free-text reflection.
    pub description: String,
    /// Integer index of the emotion kind.
    #[serde(rename = "emotionTypeIndex")]
    pub emotion_type_index: u32,
}

/// One persisted session container: owning session and position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// The session this container groups.
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    /// World position at save time.
    pub position: Vec3,
}

/// The complete persisted snapshot of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// The session that was current at save time.
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    /// Releases made into the current session (0..=3).
    #[serde(rename = "releaseCounter")]
    pub release_counter: u32,
    /// Whether the current session had reached its release limit.
    #[serde(rename = "isSessionCompleted")]
    pub is_session_completed: bool,
    /// All released tokens, in release order.
    #[serde(default)]
    pub emotions: Vec<EmotionRecord>,
    /// All session containers, in creation order.
    #[serde(default)]
    pub containers: Vec<ContainerRecord>,
}

impl Default for SaveData {
    /// The reset-equivalent empty snapshot: session `"001"`, counter 0,
    /// not completed, no tokens, no containers.
    fn default() -> Self {
        Self {
            session_id: SessionId::first(),
            release_counter: 0,
            is_session_completed: false,
            emotions: Vec::new(),
            containers: Vec::new(),
        }
    }
}
