//! Session bookkeeping, release protocol, persistence, and tick cycle.
//!
//! This crate owns all mutable simulation state. The [`SessionManager`]
//! holds every session's leader/follower bookkeeping and every live token
//! and container; the tick cycle in [`tick`] drives one frame of the
//! simulation: input, phase advance, formation steering, container
//! tracking, and periodic persistence.
//!
//! # Modules
//!
//! - [`anchor`] -- [`AnchorProvider`] seam for token spawn positions,
//!   with the default [`StandAnchors`] layout.
//! - [`config`] -- Typed configuration loaded from `solace-config.yaml`.
//! - [`token`] -- The live [`Token`]: position, texts, text-mutability
//!   lock, and embedded phase controller.
//! - [`session`] -- The [`SessionManager`] and the release / new-session /
//!   reset operations.
//! - [`persistence`] -- Snapshot/restore between live state and the flat
//!   [`SaveData`] record, plus storage-facing load/save helpers.
//! - [`storage`] -- [`Storage`] seam: single-file JSON storage and an
//!   in-memory test double.
//! - [`tick`] -- The per-frame cycle and [`TickSummary`].
//!
//! [`SessionManager`]: session::SessionManager
//! [`AnchorProvider`]: anchor::AnchorProvider
//! [`StandAnchors`]: anchor::StandAnchors
//! [`Token`]: token::Token
//! [`SaveData`]: solace_types::SaveData
//! [`Storage`]: storage::Storage
//! [`TickSummary`]: tick::TickSummary

pub mod anchor;
pub mod config;
pub mod persistence;
pub mod session;
pub mod storage;
pub mod tick;
pub mod token;

// Re-export primary types at crate root.
pub use anchor::{AnchorProvider, StandAnchors};
pub use config::{ConfigError, SolaceConfig};
pub use persistence::PersistError;
pub use session::{ReleaseError, SessionError, SessionManager, SessionSettings};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use tick::{Command, SimulationState, TickSummary, run_tick};
pub use token::{TextLock, Token};
