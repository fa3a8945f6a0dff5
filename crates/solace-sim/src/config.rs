//! Tunable parameters for follower steering and token drift.
//!
//! Both structs deserialize from the `follower` and `drift` sections of
//! `solace-config.yaml`; every field falls back to the default the
//! original scene was tuned with.

use serde::Deserialize;

/// Parameters governing how followers steer toward their leader.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FollowerConfig {
    /// Smoothing factor for exponential approach (per second).
    #[serde(default = "default_follow_smoothness")]
    pub follow_smoothness: f32,

    /// Inner comfort distance. Accepted in the config schema for
    /// compatibility with existing config files; the steering regimes
    /// key off `max_follow_distance` and `close_radius` only.
    #[serde(default = "default_min_follow_distance")]
    pub min_follow_distance: f32,

    /// Distance beyond which a follower switches to chase mode.
    #[serde(default = "default_max_follow_distance")]
    pub max_follow_distance: f32,

    /// Vertical amplitude used by offsets and formation bobbing.
    #[serde(default = "default_height_variation")]
    pub height_variation: f32,

    /// Ring-0 formation spacing; each further ring adds half a unit.
    #[serde(default = "default_close_range")]
    pub close_range: f32,

    /// Radius around a formation slot inside which movement switches
    /// from constant-rate stepping to exponential settling.
    #[serde(default = "default_close_radius")]
    pub close_radius: f32,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            follow_smoothness: default_follow_smoothness(),
            min_follow_distance: default_min_follow_distance(),
            max_follow_distance: default_max_follow_distance(),
            height_variation: default_height_variation(),
            close_range: default_close_range(),
            close_radius: default_close_radius(),
        }
    }
}

/// Parameters governing the drift phase of a newly released token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriftConfig {
    /// Translational drift speed in units per second.
    #[serde(default = "default_drift_speed")]
    pub drift_speed: f32,

    /// How long a token drifts before settling, in seconds.
    #[serde(default = "default_drift_duration_secs")]
    pub drift_duration_secs: f32,

    /// Amplitude of the bobbing oscillation.
    #[serde(default = "default_bob_intensity")]
    pub bob_intensity: f32,

    /// Frequency multiplier of the bobbing oscillation.
    #[serde(default = "default_bob_speed")]
    pub bob_speed: f32,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            drift_speed: default_drift_speed(),
            drift_duration_secs: default_drift_duration_secs(),
            bob_intensity: default_bob_intensity(),
            bob_speed: default_bob_speed(),
        }
    }
}

const fn default_follow_smoothness() -> f32 {
    2.0
}

const fn default_min_follow_distance() -> f32 {
    2.0
}

const fn default_max_follow_distance() -> f32 {
    3.5
}

const fn default_height_variation() -> f32 {
    0.3
}

const fn default_close_range() -> f32 {
    1.5
}

const fn default_close_radius() -> f32 {
    0.25
}

const fn default_drift_speed() -> f32 {
    0.5
}

const fn default_drift_duration_secs() -> f32 {
    120.0
}

const fn default_bob_intensity() -> f32 {
    0.3
}

const fn default_bob_speed() -> f32 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_scene() {
        let cfg = FollowerConfig::default();
        assert!((cfg.follow_smoothness - 2.0).abs() < f32::EPSILON);
        assert!((cfg.max_follow_distance - 3.5).abs() < f32::EPSILON);
        assert!((cfg.close_range - 1.5).abs() < f32::EPSILON);

        let drift = DriftConfig::default();
        assert!((drift.drift_speed - 0.5).abs() < f32::EPSILON);
        assert!((drift.drift_duration_secs - 120.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: Result<FollowerConfig, _> =
            serde_json::from_str(r#"{"max_follow_distance": 5.0}"#);
        let cfg = cfg.unwrap_or_default();
        assert!((cfg.max_follow_distance - 5.0).abs() < f32::EPSILON);
        assert!((cfg.follow_smoothness - 2.0).abs() < f32::EPSILON);
    }
}
