//! Enumeration types for the Solace release simulation.

use serde::{Deserialize, Serialize};

/// The emotion a released token represents.
///
/// The discriminant order is load-bearing: the save file stores a kind as
/// its integer index, and the stand anchors are addressed by the same
/// index. Never reorder variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmotionKind {
    /// Joy, gratitude, lightness.
    Happiness,
    /// Grief, loss, heaviness.
    Sadness,
    /// Anxiety, circling thoughts.
    Worry,
    /// Peace, stillness.
    Calm,
    /// Frustration, burning resentment.
    Anger,
}

impl EmotionKind {
    /// All kinds in index order.
    pub const ALL: [Self; 5] = [
        Self::Happiness,
        Self::Sadness,
        Self::Worry,
        Self::Calm,
        Self::Anger,
    ];

    /// Look up a kind by its persisted integer index.
    ///
    /// Returns `None` for an out-of-range index so callers can surface
    /// an invalid-emotion error instead of panicking.
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(usize::try_from(index).ok()?).copied()
    }

    /// The persisted integer index of this kind.
    #[allow(clippy::cast_possible_truncation)]
    pub fn index(self) -> u32 {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0) as u32
    }

    /// The display name of this kind (e.g. `"Sadness"`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Happiness => "Happiness",
            Self::Sadness => "Sadness",
            Self::Worry => "Worry",
            Self::Calm => "Calm",
            Self::Anger => "Anger",
        }
    }

    /// The reflection prompt shown while composing a release of this kind.
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Happiness => "What made you smile today...",
            Self::Sadness => "What's weighing on your heart?",
            Self::Worry => "What thoughts keep circling your mind?",
            Self::Calm => "What brings you peace right now?",
            Self::Anger => "What's burning inside you?",
        }
    }
}

impl core::fmt::Display for EmotionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The behavioral phase of a released token.
///
/// Every token starts in [`TokenPhase::Drifting`] (unless it finished a
/// drift in a previous run) and transitions exactly once to the terminal
/// [`TokenPhase::Idle`] phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TokenPhase {
    /// Drifting along an upward-biased direction after release.
    Drifting,
    /// Settled: bobbing in place, no translational drift.
    Idle,
}
