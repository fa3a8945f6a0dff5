//! Spawn-anchor seam: where a newly released token appears.
//!
//! In the full application each emotion kind has a visual on a stand and
//! a token spawns at the currently selected visual's position. The engine
//! only needs that position, so the seam is a single-method trait; the
//! default [`StandAnchors`] arranges the five kinds in a line the way the
//! stand does.

use glam::Vec3;

use solace_types::EmotionKind;

/// Provides the spawn position for a newly released token.
pub trait AnchorProvider {
    /// The world position where a token of `kind` should spawn.
    fn anchor_position(&self, kind: EmotionKind) -> Vec3;
}

/// Default anchor layout: the five stand visuals in a row at chest
/// height, spaced 1.5 units apart and centered on the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandAnchors;

impl AnchorProvider for StandAnchors {
    fn anchor_position(&self, kind: EmotionKind) -> Vec3 {
        let index = kind.index() as f32;
        Vec3::new((index - 2.0) * 1.5, 1.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_are_distinct_per_kind() {
        let anchors = StandAnchors;
        let positions: Vec<Vec3> = EmotionKind::ALL
            .iter()
            .map(|kind| anchors.anchor_position(*kind))
            .collect();

        for (i, a) in positions.iter().enumerate() {
            for b in positions.iter().skip(i + 1) {
                assert!(a.distance(*b) > 0.5);
            }
        }
    }

    #[test]
    fn middle_kind_sits_on_the_origin_line() {
        let anchors = StandAnchors;
        let worry = anchors.anchor_position(EmotionKind::Worry);
        assert!((worry.x - 0.0).abs() < f32::EPSILON);
        assert!((worry.y - 1.0).abs() < f32::EPSILON);
    }
}
