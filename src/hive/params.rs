//! Sanitized runtime parameters derived from [`GameConfig`].
//!
//! Config problems never abort the game: inverted ranges are swapped, sizes and
//! durations clamped, and out-of-range fractions replaced by defaults. The matching
//! human readable warnings come from [`GameConfig::validate`].

use bevy::math::Vec2;
use std::ops::RangeInclusive;

use crate::core::config::{GameConfig, GestureMode, SpawnRange};

use super::placement::PlacementGenerator;

const DEFAULT_STEP_FRACTION: f32 = 0.02;
/// Caps a hive at 1000 depletion steps.
pub const MIN_STEP_FRACTION: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct HiveParams {
    pub members: usize,
    pub area: Vec2,
    pub threshold: f32,
    pub step_fraction: f32,
    pub final_floor: RangeInclusive<u32>,
    pub hits_required: RangeInclusive<u32>,
    pub min_distance: f32,
    pub max_attempts: u32,
    pub removal_duration: f32,
    pub removal_distance: f32,
    pub burst_batches: u32,
    pub burst_interval: f32,
}

fn ordered(r: &SpawnRange<u32>) -> RangeInclusive<u32> {
    if r.min <= r.max {
        r.min..=r.max
    } else {
        r.max..=r.min
    }
}

impl HiveParams {
    pub fn from_config(cfg: &GameConfig) -> Self {
        let h = &cfg.hive;
        let hits = ordered(&h.hits_required);
        let step_fraction = if h.step_fraction > 0.0 && h.step_fraction <= 1.0 {
            h.step_fraction.max(MIN_STEP_FRACTION)
        } else {
            DEFAULT_STEP_FRACTION
        };
        Self {
            members: h.members,
            area: Vec2::new(h.area.width.max(0.0), h.area.height.max(0.0)),
            threshold: h.threshold.max(f32::EPSILON),
            step_fraction,
            final_floor: ordered(&h.final_floor),
            hits_required: (*hits.start()).max(1)..=(*hits.end()).max(1),
            min_distance: cfg.placement.min_distance.max(0.0),
            max_attempts: cfg.placement.max_attempts,
            removal_duration: cfg.removal.duration.max(0.0),
            removal_distance: cfg.removal.distance,
            burst_batches: cfg.removal.burst_batches.max(1),
            burst_interval: cfg.removal.burst_interval.max(0.0),
        }
    }

    /// Number of depletion steps between empty and full progress.
    pub fn step_count(&self) -> u32 {
        (1.0 / self.step_fraction - 1e-4).ceil().max(1.0) as u32
    }

    pub fn step_size(&self) -> f32 {
        self.threshold * self.step_fraction
    }

    pub fn placement(&self) -> PlacementGenerator {
        PlacementGenerator::new(self.area, self.min_distance, self.max_attempts)
    }
}

impl Default for HiveParams {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearParams {
    pub deadzone: f32,
    pub rate: f32,
    pub shake_intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotaryParams {
    pub pivot: Vec2,
    pub grab_radius: f32,
    pub base_multiplier: f32,
    pub max_multiplier: f32,
    pub acceleration_rate: f32,
    pub deceleration_rate: f32,
    pub min_angle_deg: f32,
    pub energy_per_degree: f32,
    pub revolutions_per_unit: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureParams {
    pub mode: GestureMode,
    pub linear: LinearParams,
    pub rotary: RotaryParams,
}

impl GestureParams {
    pub fn from_config(cfg: &GameConfig) -> Self {
        let lin = &cfg.gesture.linear;
        let rot = &cfg.gesture.rotary;
        let base = rot.base_multiplier.max(0.0);
        Self {
            mode: cfg.gesture.mode,
            linear: LinearParams {
                deadzone: lin.deadzone.max(0.0),
                rate: lin.rate.max(0.0),
                shake_intensity: lin.shake_intensity.max(0.0),
            },
            rotary: RotaryParams {
                pivot: Vec2::new(rot.pivot_x, rot.pivot_y),
                grab_radius: rot.grab_radius.max(0.0),
                base_multiplier: base,
                max_multiplier: rot.max_multiplier.max(base),
                acceleration_rate: rot.acceleration_rate.max(0.0),
                deceleration_rate: rot.deceleration_rate.max(0.0),
                min_angle_deg: rot.min_angle_deg.max(0.0),
                energy_per_degree: rot.energy_per_degree.max(0.0),
                revolutions_per_unit: rot.revolutions_per_unit.max(f32::EPSILON),
            },
        }
    }
}

impl Default for GestureParams {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}
