//! The drift-then-idle state machine carried by every released token.
//!
//! A token begins in [`TokenPhase::Drifting`]: it bobs while translating
//! along an upward-biased direction drawn once at creation. After a fixed
//! duration (or when forced), it enters the terminal
//! [`TokenPhase::Idle`] phase: bobbing in place only. The transition is
//! one-way and fires a [`PhaseEvent::EnteredIdle`] notification exactly
//! once, no matter how the controller got there.
//!
//! Motion is resumable per-tick state, not a background task: callers
//! invoke [`PhaseController::advance`] once per frame with the elapsed
//! time and apply the returned displacement themselves.

use glam::Vec3;
use rand::Rng;
use tracing::debug;

use solace_types::TokenPhase;

use crate::config::DriftConfig;
use crate::motion;

/// A one-shot notification emitted by a [`PhaseController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// The token just entered its idle phase for the first time.
    EnteredIdle,
}

/// Per-token phase state machine.
#[derive(Debug, Clone)]
pub struct PhaseController {
    phase: TokenPhase,
    /// Upward-biased drift direction, fixed for the token's lifetime.
    drift_direction: Vec3,
    /// Seconds spent drifting so far.
    elapsed: f32,
    /// Whether the idle notification has already fired.
    notified: bool,
    /// True once the token has completed a drift phase in any run.
    released_before: bool,
}

impl PhaseController {
    /// Create a controller for a token.
    ///
    /// A fresh release starts in [`TokenPhase::Drifting`]; a token that
    /// already finished a drift in a previous run (`released_before`)
    /// starts directly in [`TokenPhase::Idle`], with its notification
    /// still pending so listeners learn about the settled token on the
    /// first tick after load.
    pub fn new(rng: &mut impl Rng, released_before: bool) -> Self {
        Self {
            phase: if released_before {
                TokenPhase::Idle
            } else {
                TokenPhase::Drifting
            },
            drift_direction: motion::drift_direction(rng),
            elapsed: 0.0,
            notified: false,
            released_before,
        }
    }

    /// The current phase.
    pub const fn phase(&self) -> TokenPhase {
        self.phase
    }

    /// Whether the token has settled into idle.
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, TokenPhase::Idle)
    }

    /// Whether the token has ever completed a drift phase.
    pub const fn released_before(&self) -> bool {
        self.released_before
    }

    /// The fixed drift direction (exposed for inspection and tests).
    pub const fn drift_direction(&self) -> Vec3 {
        self.drift_direction
    }

    /// Advance the state machine by one frame.
    ///
    /// Returns the displacement to apply to the token's position this
    /// frame, and the idle notification if the transition fired during
    /// this call (including the deferred notification of a controller
    /// constructed directly in idle).
    pub fn advance(
        &mut self,
        time: f32,
        dt: f32,
        cfg: &DriftConfig,
    ) -> (Vec3, Option<PhaseEvent>) {
        let bob = motion::bob_velocity(time, cfg) * dt;

        match self.phase {
            TokenPhase::Drifting => {
                let displacement = bob + self.drift_direction * cfg.drift_speed * dt;
                self.elapsed += dt;
                let event = if self.elapsed >= cfg.drift_duration_secs {
                    self.enter_idle()
                } else {
                    None
                };
                (displacement, event)
            }
            TokenPhase::Idle => (bob, self.take_pending_notification()),
        }
    }

    /// Force the token into idle immediately.
    ///
    /// Returns the notification if this call performed the transition;
    /// forcing an already-idle token is a no-op.
    pub fn force_idle(&mut self) -> Option<PhaseEvent> {
        if self.is_idle() {
            self.take_pending_notification()
        } else {
            self.enter_idle()
        }
    }

    /// Perform the one-way transition into idle.
    fn enter_idle(&mut self) -> Option<PhaseEvent> {
        debug!(elapsed = self.elapsed, "token entering idle phase");
        self.phase = TokenPhase::Idle;
        self.released_before = true;
        self.take_pending_notification()
    }

    /// Emit the idle notification if it has not fired yet.
    fn take_pending_notification(&mut self) -> Option<PhaseEvent> {
        if self.notified {
            None
        } else {
            self.notified = true;
            Some(PhaseEvent::EnteredIdle)
        }
    }
}
