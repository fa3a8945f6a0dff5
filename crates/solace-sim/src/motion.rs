//! Low-level movement primitives shared by drift and formation steering.
//!
//! Everything here is a pure function of its inputs. Time-varying motion
//! (bobbing) takes the accumulated simulation time explicitly rather than
//! reading a clock, which keeps every caller deterministic and testable.

use glam::Vec3;
use rand::Rng;

use crate::config::DriftConfig;

/// Vertical offsets steeper than this are reflected upward when drawing
/// a follower offset, so followers never target positions underground.
const OFFSET_FLOOR: f32 = -0.2;

/// Damping applied to a reflected vertical component.
const REFLECT_DAMPING: f32 = 0.3;

/// Scale applied to the vertical component of a drift direction.
const DRIFT_VERTICAL_SCALE: f32 = 0.3;

/// Exponential approach: first-order low-pass filter toward a target.
///
/// The interpolation factor is `smoothness * dt`, clamped to `[0, 1]` so
/// a long frame can never overshoot the target.
pub fn exp_approach(current: Vec3, target: Vec3, smoothness: f32, dt: f32) -> Vec3 {
    current.lerp(target, (smoothness * dt).clamp(0.0, 1.0))
}

/// Constant-rate step toward a target, never overshooting.
///
/// Moves `current` at most `max_delta` units along the straight line to
/// `target`; if the target is within `max_delta` it is reached exactly.
pub fn step_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let to_target = target - current;
    let distance = to_target.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + to_target / distance * max_delta
    }
}

/// Bobbing velocity at a given simulation time.
///
/// A gentle three-axis oscillation: each axis runs at a slightly different
/// frequency so the combined motion never looks mechanical. The caller
/// multiplies by `dt` to get a per-tick displacement.
pub fn bob_velocity(time: f32, cfg: &DriftConfig) -> Vec3 {
    let x = (time * cfg.bob_speed * 0.7).sin() * cfg.bob_intensity * 0.1;
    let y = (time * cfg.bob_speed).sin() * cfg.bob_intensity * 0.2;
    let z = (time * cfg.bob_speed * 0.8).cos() * cfg.bob_intensity * 0.1;
    Vec3::new(x, y, z)
}

/// Vertical bob offset for a follower holding a formation slot.
///
/// The frequency depends on the follower's slot index so neighbors never
/// bob in sync.
pub fn formation_bob(time: f32, index: usize, height_variation: f32) -> f32 {
    let frequency = 1.5 + index as f32 * 0.3;
    (time * frequency).sin() * height_variation
}

/// Draw a uniformly distributed point on the unit sphere.
pub fn unit_sphere(rng: &mut impl Rng) -> Vec3 {
    let y: f32 = rng.random_range(-1.0..=1.0);
    let theta: f32 = rng.random_range(0.0..core::f32::consts::TAU);
    let radius = (1.0 - y * y).max(0.0).sqrt();
    Vec3::new(radius * theta.cos(), y, radius * theta.sin())
}

/// Draw the persistent chase offset for a new follower.
///
/// A uniform sphere point with its vertical component scaled by
/// `height_variation`; components pointing too far downward are reflected
/// and damped so the offset never targets below the leader's footing.
/// The result is renormalized to unit length.
pub fn follower_offset(rng: &mut impl Rng, height_variation: f32) -> Vec3 {
    let mut point = unit_sphere(rng);
    point.y *= height_variation;

    if point.y < OFFSET_FLOOR {
        point.y = -point.y * REFLECT_DAMPING;
    }

    point.normalize_or(Vec3::Y)
}

/// Draw the drift direction for a newly released token.
///
/// Uniform sphere point with the vertical component's absolute value
/// scaled down and renormalized: drift is upward-biased and never
/// straight down.
pub fn drift_direction(rng: &mut impl Rng) -> Vec3 {
    let mut direction = unit_sphere(rng);
    direction.y = direction.y.abs() * DRIFT_VERTICAL_SCALE;
    direction.normalize_or(Vec3::Y)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn exp_approach_converges_without_overshoot() {
        let target = Vec3::new(10.0, 0.0, 0.0);
        let mut pos = Vec3::ZERO;
        for _ in 0..200 {
            let next = exp_approach(pos, target, 2.0, 0.033);
            assert!(next.x >= pos.x);
            assert!(next.x <= target.x);
            pos = next;
        }
        assert!((pos - target).length() < 1.0);
    }

    #[test]
    fn exp_approach_clamps_long_frames() {
        let target = Vec3::new(1.0, 2.0, 3.0);
        // smoothness * dt = 4.0 would overshoot unclamped.
        let next = exp_approach(Vec3::ZERO, target, 2.0, 2.0);
        assert!((next - target).length() < 1e-6);
    }

    #[test]
    fn step_towards_caps_at_max_delta() {
        let next = step_towards(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 1.0);
        assert!((next.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn step_towards_reaches_close_targets_exactly() {
        let target = Vec3::new(0.3, 0.0, 0.0);
        let next = step_towards(Vec3::ZERO, target, 1.0);
        assert_eq!(next, target);
    }

    #[test]
    fn bob_velocity_is_bounded_by_intensity() {
        let cfg = DriftConfig::default();
        for i in 0..500 {
            let v = bob_velocity(i as f32 * 0.1, &cfg);
            assert!(v.x.abs() <= cfg.bob_intensity * 0.1 + 1e-6);
            assert!(v.y.abs() <= cfg.bob_intensity * 0.2 + 1e-6);
            assert!(v.z.abs() <= cfg.bob_intensity * 0.1 + 1e-6);
        }
    }

    #[test]
    fn neighboring_followers_bob_out_of_sync() {
        // Same instant, different indices: the offsets must diverge
        // somewhere over a few seconds.
        let mut diverged = false;
        for i in 0..100 {
            let t = i as f32 * 0.05;
            let a = formation_bob(t, 0, 0.3);
            let b = formation_bob(t, 1, 0.3);
            if (a - b).abs() > 0.05 {
                diverged = true;
                break;
            }
        }
        assert!(diverged);
    }

    #[test]
    fn unit_sphere_points_are_unit_length() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let p = unit_sphere(&mut rng);
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn follower_offsets_never_point_steeply_down() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..500 {
            let offset = follower_offset(&mut rng, 0.3);
            assert!((offset.length() - 1.0).abs() < 1e-5);
            // The floor applies to the pre-normalization component; the
            // renormalized vertical component bottoms out near -0.26.
            assert!(offset.y > -0.27);
        }
    }

    #[test]
    fn drift_is_never_downward() {
        let mut rng = SmallRng::seed_from_u64(13);
        for _ in 0..500 {
            let direction = drift_direction(&mut rng);
            assert!(direction.y >= 0.0);
            assert!((direction.length() - 1.0).abs() < 1e-5);
        }
    }
}
