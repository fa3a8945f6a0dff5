//! The live token: position, texts, text lock, and phase controller.

use glam::Vec3;
use rand::Rng;

use solace_sim::{DriftConfig, PhaseController, PhaseEvent};
use solace_types::{EmotionKind, SessionId, TokenId, TokenPhase};

/// Whether a token's label and description may still be changed.
///
/// The window opens at spawn and counts down in frames; once closed it
/// never reopens. An explicit two-state lock rather than a timer so the
/// state is inspectable and survives being stepped at any frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLock {
    /// Texts are mutable for this many more frames.
    Open {
        /// Frames remaining until the lock closes.
        ticks_remaining: u32,
    },
    /// Texts are frozen for the rest of the token's life.
    Closed,
}

impl TextLock {
    /// Count the lock down by one frame.
    pub fn tick(&mut self) {
        if let Self::Open { ticks_remaining } = self {
            *ticks_remaining = ticks_remaining.saturating_sub(1);
            if *ticks_remaining == 0 {
                *self = Self::Closed;
            }
        }
    }

    /// Whether the lock is still open.
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

/// A released emotional token.
#[derive(Debug, Clone)]
pub struct Token {
    /// Stable identity.
    pub id: TokenId,
    /// The emotion this token represents.
    pub kind: EmotionKind,
    /// The session this token was released into.
    pub session_id: SessionId,
    /// Current world position.
    pub position: Vec3,
    /// The emotion label, stamped explicitly at release time.
    pub label: String,
    /// The user's free-text reflection.
    pub description: String,
    /// Mutability window for `label`/`description`.
    pub text_lock: TextLock,
    /// The drift-then-idle state machine.
    pub phase: PhaseController,
}

impl Token {
    /// Create a token at a spawn position.
    ///
    /// `released_before` controls whether the token skips drifting (a
    /// token reconstructed from an old session has already drifted).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: EmotionKind,
        session_id: SessionId,
        position: Vec3,
        label: &str,
        description: &str,
        text_lock_ticks: u32,
        released_before: bool,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            id: TokenId::new(),
            kind,
            session_id,
            position,
            label: label.to_owned(),
            description: description.to_owned(),
            text_lock: TextLock::Open {
                ticks_remaining: text_lock_ticks.max(1),
            },
            phase: PhaseController::new(rng, released_before),
        }
    }

    /// Overwrite the token's texts while the text lock is open.
    ///
    /// Returns `false` (and changes nothing) once the lock has closed.
    pub fn set_text(&mut self, label: &str, description: &str) -> bool {
        if !self.text_lock.is_open() {
            return false;
        }
        self.label = label.to_owned();
        self.description = description.to_owned();
        true
    }

    /// Advance the token one frame: text lock countdown, phase machine,
    /// and position displacement. Returns the idle notification if the
    /// phase transition fired this frame.
    pub fn advance(&mut self, time: f32, dt: f32, cfg: &DriftConfig) -> Option<PhaseEvent> {
        self.text_lock.tick();
        let (displacement, event) = self.phase.advance(time, dt, cfg);
        self.position += displacement;
        event
    }

    /// The token's current phase.
    pub const fn phase(&self) -> TokenPhase {
        self.phase.phase()
    }

    /// Display name derived from the emotion kind.
    pub fn display_name(&self) -> String {
        format!("{} Token", self.kind.name())
    }
}
