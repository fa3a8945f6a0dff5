//! Follower steering: chase mode, formation mode, and ring placement.
//!
//! Each follower is steered toward its session leader once per tick.
//! The regime depends on distance:
//!
//! - **Chase** (beyond `max_follow_distance`): head for the leader plus
//!   the follower's persistent offset, with exponential smoothing.
//! - **Formation** (within range): head for a triangular-ring slot around
//!   the leader plus a per-follower vertical bob. Constant-rate stepping
//!   while far from the slot, exponential settling once inside the snap
//!   radius, so followers neither overshoot nor jitter in place.
//!
//! Ring slots hold three followers each; the fourth follower opens a
//! wider ring automatically.

use glam::Vec3;

use crate::config::FollowerConfig;
use crate::motion;

/// World-space right axis of a settled leader.
///
/// Tokens never rotate after release, so the leader's local frame is the
/// world frame.
pub const LEADER_RIGHT: Vec3 = Vec3::X;

/// World-space forward axis of a settled leader.
pub const LEADER_FORWARD: Vec3 = Vec3::Z;

/// Followers per formation ring.
const SLOTS_PER_RING: usize = 3;

/// Additional spacing per formation ring beyond the first.
const RING_SPACING_STEP: f32 = 0.5;

/// Rear-slot spacing multiplier (the rear point sits slightly further
/// out so the triangle reads as a triangle from above).
const REAR_SLOT_SCALE: f32 = 1.2;

/// Which steering regime a follower is in this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerRegime {
    /// Too far from the leader: chasing leader + persistent offset.
    Chase,
    /// Within range: holding a triangular-ring slot.
    Formation,
}

/// Compute the triangular-ring slot position for follower `index`.
///
/// Ring number is `index / 3`, slot-in-ring is `index % 3`; spacing grows
/// by [`RING_SPACING_STEP`] per ring. The three slots sit front-left,
/// front-right, and behind the leader.
pub fn triangle_slot(leader_pos: Vec3, index: usize, close_range: f32) -> Vec3 {
    let ring = (index / SLOTS_PER_RING) as f32;
    let spacing = close_range + ring * RING_SPACING_STEP;

    let right = LEADER_RIGHT * spacing;
    let forward = LEADER_FORWARD * spacing;

    match index % SLOTS_PER_RING {
        0 => leader_pos + (-right + forward),
        1 => leader_pos + (right + forward),
        _ => leader_pos + (-forward * REAR_SLOT_SCALE),
    }
}

/// Compute this tick's target position and regime for a follower.
///
/// `offset` is the follower's persistent chase offset; `index` is its
/// slot index within the session's follower list; `time` is accumulated
/// simulation time (drives the formation bob).
pub fn follower_target(
    follower_pos: Vec3,
    leader_pos: Vec3,
    offset: Vec3,
    index: usize,
    time: f32,
    cfg: &FollowerConfig,
) -> (Vec3, SteerRegime) {
    let distance = follower_pos.distance(leader_pos);

    if distance > cfg.max_follow_distance {
        (leader_pos + offset, SteerRegime::Chase)
    } else {
        let slot = triangle_slot(leader_pos, index, cfg.close_range);
        let bob = Vec3::new(0.0, motion::formation_bob(time, index, cfg.height_variation), 0.0);
        (slot + bob, SteerRegime::Formation)
    }
}

/// Steer a follower one tick toward its leader and return its new position.
pub fn steer_follower(
    follower_pos: Vec3,
    leader_pos: Vec3,
    offset: Vec3,
    index: usize,
    time: f32,
    dt: f32,
    cfg: &FollowerConfig,
) -> Vec3 {
    let (target, regime) = follower_target(follower_pos, leader_pos, offset, index, time, cfg);

    match regime {
        SteerRegime::Chase => motion::exp_approach(follower_pos, target, cfg.follow_smoothness, dt),
        SteerRegime::Formation => {
            let to_target = follower_pos.distance(target);
            if to_target > cfg.close_radius {
                // Constant-rate approach avoids perceptible overshoot.
                motion::step_towards(follower_pos, target, cfg.follow_smoothness * dt)
            } else {
                // Inside the snap radius, smooth into place to kill jitter.
                motion::exp_approach(follower_pos, target, cfg.follow_smoothness, dt)
            }
        }
    }
}

/// Move a session container one tick toward its leader's position.
pub fn track_container(container_pos: Vec3, leader_pos: Vec3, smoothness: f32, dt: f32) -> Vec3 {
    motion::exp_approach(container_pos, leader_pos, smoothness, dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_zero_slots_are_distinct() {
        let cfg = FollowerConfig::default();
        let leader = Vec3::ZERO;
        let a = triangle_slot(leader, 0, cfg.close_range);
        let b = triangle_slot(leader, 1, cfg.close_range);
        let c = triangle_slot(leader, 2, cfg.close_range);

        assert!(a.distance(b) > 0.1);
        assert!(a.distance(c) > 0.1);
        assert!(b.distance(c) > 0.1);
    }

    #[test]
    fn ring_zero_slots_sit_at_ring_radius() {
        let cfg = FollowerConfig::default();
        let spacing = cfg.close_range;
        let leader = Vec3::ZERO;

        // Front slots sit at spacing * sqrt(2), the rear slot at
        // spacing * 1.2 -- all within half a unit of the configured
        // ring-0 spacing.
        for index in 0..3 {
            let slot = triangle_slot(leader, index, spacing);
            let distance = slot.distance(leader);
            assert!((distance - spacing).abs() < 0.75, "slot {index} at {distance}");
        }

        let front_left = triangle_slot(leader, 0, spacing);
        let rear = triangle_slot(leader, 2, spacing);
        assert!((front_left.distance(leader) - spacing * core::f32::consts::SQRT_2).abs() < 1e-4);
        assert!((rear.distance(leader) - spacing * REAR_SLOT_SCALE).abs() < 1e-4);
    }

    #[test]
    fn fourth_follower_opens_a_wider_ring() {
        let cfg = FollowerConfig::default();
        let leader = Vec3::ZERO;
        let inner = triangle_slot(leader, 0, cfg.close_range);
        let outer = triangle_slot(leader, 3, cfg.close_range);
        assert!(outer.distance(leader) > inner.distance(leader));
        // Same slot shape, wider spacing.
        assert!((outer.normalize() - inner.normalize()).length() < 1e-5);
    }

    #[test]
    fn distant_follower_chases_with_its_offset() {
        let cfg = FollowerConfig::default();
        let leader = Vec3::ZERO;
        let offset = Vec3::new(0.0, 0.4, -0.9);
        let follower = Vec3::new(10.0, 0.0, 0.0);

        let (target, regime) = follower_target(follower, leader, offset, 0, 0.0, &cfg);
        assert_eq!(regime, SteerRegime::Chase);
        assert_eq!(target, leader + offset);
    }

    #[test]
    fn nearby_follower_targets_its_slot() {
        let cfg = FollowerConfig::default();
        let leader = Vec3::ZERO;
        let follower = Vec3::new(1.0, 0.0, 1.0);

        let (target, regime) =
            follower_target(follower, leader, Vec3::X, 1, 0.0, &cfg);
        assert_eq!(regime, SteerRegime::Formation);

        let slot = triangle_slot(leader, 1, cfg.close_range);
        // At time 0 the bob offset is zero, so the target is the slot.
        assert!((target - slot).length() < 1e-6);
    }

    #[test]
    fn steering_closes_on_the_slot_over_time() {
        let cfg = FollowerConfig::default();
        let leader = Vec3::ZERO;
        let mut pos = Vec3::new(2.0, 0.5, -1.0);

        let mut time = 0.0;
        for _ in 0..2000 {
            pos = steer_follower(pos, leader, Vec3::X, 2, time, 0.033, &cfg);
            time += 0.033;
        }

        let slot = triangle_slot(leader, 2, cfg.close_range);
        // Settles around the slot; bobbing keeps it within the snap
        // radius plus bob amplitude.
        assert!(pos.distance(slot) < cfg.close_radius + cfg.height_variation + 0.1);
    }

    #[test]
    fn chase_steering_is_exponential_not_constant() {
        let cfg = FollowerConfig::default();
        let leader = Vec3::ZERO;
        let far = Vec3::new(20.0, 0.0, 0.0);
        let near = Vec3::new(5.0, 0.0, 0.0);

        let step_far = far.distance(steer_follower(far, leader, Vec3::Y, 0, 0.0, 0.033, &cfg));
        let step_near = near.distance(steer_follower(near, leader, Vec3::Y, 0, 0.0, 0.033, &cfg));
        // An exponential approach moves proportionally to distance.
        assert!(step_far > step_near * 2.0);
    }

    #[test]
    fn container_tracks_leader() {
        let mut pos = Vec3::new(5.0, 0.0, 0.0);
        let leader = Vec3::new(0.0, 1.0, 0.0);
        for _ in 0..400 {
            pos = track_container(pos, leader, 2.0, 0.033);
        }
        assert!(pos.distance(leader) < 0.05);
    }
}
