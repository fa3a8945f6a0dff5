//! Formation steering and token phase mechanics for the Solace simulation.
//!
//! This crate is pure per-tick math: no session bookkeeping, no I/O. Given
//! a leader, a follower, and a slot, it computes where the follower should
//! be one tick later; given a drifting token, it computes its displacement
//! and tells the caller when the drift phase ends.
//!
//! # Modules
//!
//! - [`config`] -- Tunable parameters for steering and drift, with the
//!   defaults the rest of the workspace assumes.
//! - [`motion`] -- Low-level movement primitives: exponential approach,
//!   constant-rate stepping, bobbing oscillation, and random direction
//!   draws.
//! - [`phase`] -- [`PhaseController`], the drift-then-idle state machine
//!   carried by every released token.
//! - [`formation`] -- Triangular-ring slot placement and the chase /
//!   formation steering regimes for followers, plus container tracking.
//!
//! [`PhaseController`]: phase::PhaseController

pub mod config;
pub mod formation;
pub mod motion;
pub mod phase;

// Re-export primary types at crate root.
pub use config::{DriftConfig, FollowerConfig};
pub use formation::{SteerRegime, follower_target, steer_follower, track_container, triangle_slot};
pub use motion::follower_offset;
pub use phase::{PhaseController, PhaseEvent};
