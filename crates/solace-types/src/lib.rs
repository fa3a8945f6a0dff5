//! Shared type definitions for the Solace release simulation.
//!
//! This crate is the single source of truth for the types used across the
//! Solace workspace: entity identifiers, the emotion enumeration, the token
//! phase enumeration, and the flat persisted-record types written to the
//! save file.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers: UUID wrappers for runtime entities
//!   and the zero-padded [`SessionId`] string newtype.
//! - [`enums`] -- [`EmotionKind`] and [`TokenPhase`] enumerations.
//! - [`records`] -- Flat persisted-record types ([`SaveData`] and friends)
//!   with serde field names matching the on-disk JSON.
//!
//! [`SessionId`]: ids::SessionId
//! [`EmotionKind`]: enums::EmotionKind
//! [`TokenPhase`]: enums::TokenPhase
//! [`SaveData`]: records::SaveData

pub mod enums;
pub mod ids;
pub mod records;

// Re-export all public types at crate root for convenience.
pub use enums::{EmotionKind, TokenPhase};
pub use ids::{ContainerId, SessionId, TokenId};
pub use records::{ContainerRecord, EmotionRecord, SaveData};
