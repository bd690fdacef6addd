use bevy::prelude::*;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::hive::params::MIN_STEP_FRACTION;

#[derive(Debug, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Hive Shaker".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpawnRange<T> {
    pub min: T,
    pub max: T,
}
impl<T: Default> Default for SpawnRange<T> {
    fn default() -> Self {
        Self {
            min: Default::default(),
            max: Default::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SizeConfig {
    pub width: f32,
    pub height: f32,
}
impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            width: 240.0,
            height: 120.0,
        }
    }
}

/// Population and depletion schedule of a single hive.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HiveConfig {
    pub members: usize,
    pub area: SizeConfig,
    pub threshold: f32,
    /// Depletion step size as a fraction of `threshold` (0.02 = every 2%).
    pub step_fraction: f32,
    pub final_floor: SpawnRange<u32>,
    pub hits_required: SpawnRange<u32>,
}
impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            members: 50,
            area: SizeConfig::default(),
            threshold: 100.0,
            step_fraction: 0.02,
            final_floor: SpawnRange { min: 5, max: 8 },
            hits_required: SpawnRange { min: 1, max: 3 },
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    pub min_distance: f32,
    pub max_attempts: u32,
}
impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_distance: 9.0,
            max_attempts: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RemovalConfig {
    /// Seconds for one member to fly out.
    pub duration: f32,
    /// World distance of the outward flight.
    pub distance: f32,
    /// Final surplus burst: number of batches and seconds between them.
    pub burst_batches: u32,
    pub burst_interval: f32,
}
impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            duration: 0.5,
            distance: 300.0,
            burst_batches: 5,
            burst_interval: 0.2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureMode {
    /// Vertical shaking of the hive.
    #[default]
    Linear,
    /// Cranking a handle around a pivot.
    Rotary,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LinearDragConfig {
    /// Minimum |dy| per sample (world units) that counts as shaking.
    pub deadzone: f32,
    /// Energy per second while shaking.
    pub rate: f32,
    /// Radius of the cosmetic anchor jitter.
    pub shake_intensity: f32,
}
impl Default for LinearDragConfig {
    fn default() -> Self {
        Self {
            deadzone: 6.0,
            rate: 20.0,
            shake_intensity: 12.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RotaryConfig {
    pub pivot_x: f32,
    pub pivot_y: f32,
    pub grab_radius: f32,
    pub base_multiplier: f32,
    pub max_multiplier: f32,
    /// Multiplier gained per second of same-direction rotation.
    pub acceleration_rate: f32,
    /// How much faster the rotation timer unwinds after release.
    pub deceleration_rate: f32,
    /// Angles below this (degrees) neither count as rotation nor flip direction.
    pub min_angle_deg: f32,
    pub energy_per_degree: f32,
    pub revolutions_per_unit: f32,
}
impl Default for RotaryConfig {
    fn default() -> Self {
        Self {
            pivot_x: 0.0,
            pivot_y: -220.0,
            grab_radius: 120.0,
            base_multiplier: 1.0,
            max_multiplier: 3.0,
            acceleration_rate: 0.5,
            deceleration_rate: 2.0,
            min_angle_deg: 0.1,
            energy_per_degree: 0.05,
            revolutions_per_unit: 20.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GestureConfig {
    pub mode: GestureMode,
    pub linear: LinearDragConfig,
    pub rotary: RotaryConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SlotConfig {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}
impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConveyorConfig {
    pub retiring: SlotConfig,
    pub active: SlotConfig,
    pub queued: SlotConfig,
    pub transition_duration: f32,
}
impl Default for ConveyorConfig {
    fn default() -> Self {
        Self {
            retiring: SlotConfig { x: -420.0, y: 0.0, scale: 1.0 },
            active: SlotConfig { x: 0.0, y: 0.0, scale: 1.5 },
            queued: SlotConfig { x: 420.0, y: 0.0, scale: 1.0 },
            transition_duration: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BrushConfig {
    /// Pointer detection radius for contacts.
    pub radius: f32,
}
impl Default for BrushConfig {
    fn default() -> Self {
        Self { radius: 18.0 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Round length in seconds; 0 disables the timer.
    pub time_limit: f32,
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
}
impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit: 60.0,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub hive: HiveConfig,
    pub placement: PlacementConfig,
    pub removal: RemovalConfig,
    pub gesture: GestureConfig,
    pub conveyor: ConveyorConfig,
    pub brush: BrushConfig,
    pub session: SessionConfig,
}

impl GameConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    /// Loads and merges every readable file in order (later files override earlier
    /// keys). Returns the config, the paths used, and any read/parse errors.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();
        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let existing = bm.iter_mut().find(|(ek, _)| **ek == k).map(|(_, e)| e);
                        match existing {
                            Some(existing) => merge_value(existing, v),
                            None => {
                                bm.insert(k, v);
                            }
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        match merged {
            Some(val) => match val.into_rust::<GameConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    errors.push(format!("failed to deserialize merged config; using defaults: {e}"));
                    (GameConfig::default(), used, errors)
                }
            },
            None => (GameConfig::default(), used, errors),
        }
    }

    /// Human readable warnings. Nothing here is fatal; runtime params are sanitized.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        let h = &self.hive;
        if h.members == 0 {
            w.push("hive.members is 0; every hive completes immediately".into());
        }
        if h.members > 5_000 {
            w.push(format!("hive.members {} very high; performance may suffer", h.members));
        }
        if h.area.width <= 0.0 || h.area.height <= 0.0 {
            w.push("hive.area must be > 0 in both dimensions".into());
        }
        if h.threshold <= 0.0 {
            w.push(format!("hive.threshold {} must be > 0 (clamped)", h.threshold));
        }
        if !(h.step_fraction > 0.0 && h.step_fraction <= 1.0) {
            w.push(format!(
                "hive.step_fraction {} outside (0, 1]; falling back to 0.02",
                h.step_fraction
            ));
        } else if h.step_fraction < MIN_STEP_FRACTION {
            w.push(format!(
                "hive.step_fraction {} below {}; raised to {}",
                h.step_fraction, MIN_STEP_FRACTION, MIN_STEP_FRACTION
            ));
        }
        fn check_range_u32(w: &mut Vec<String>, label: &str, r: &SpawnRange<u32>) {
            if r.min > r.max {
                w.push(format!("{label} min ({}) greater than max ({}) -> swapped", r.min, r.max));
            }
        }
        check_range_u32(&mut w, "hive.final_floor", &h.final_floor);
        check_range_u32(&mut w, "hive.hits_required", &h.hits_required);
        if h.hits_required.min == 0 {
            w.push("hive.hits_required.min is 0; clamped to 1".into());
        }
        if (h.final_floor.min.max(h.final_floor.max) as usize) > h.members {
            w.push(format!(
                "hive.final_floor up to {} exceeds hive.members {}; shaking removes nothing",
                h.final_floor.max, h.members
            ));
        }
        let p = &self.placement;
        if p.min_distance < 0.0 {
            w.push("placement.min_distance negative; treated as 0".into());
        }
        if p.max_attempts == 0 && p.min_distance > 0.0 {
            w.push("placement.max_attempts is 0; spacing is never enforced".into());
        }
        let area = h.area.width.max(0.0) * h.area.height.max(0.0);
        let disc = std::f32::consts::PI * (p.min_distance * 0.5).powi(2);
        if disc * h.members as f32 > area * 0.55 {
            w.push(format!(
                "placement.min_distance {} too large for {} members in {}x{}; spacing is best-effort",
                p.min_distance, h.members, h.area.width, h.area.height
            ));
        }
        let r = &self.removal;
        if r.duration < 0.0 || r.burst_interval < 0.0 {
            w.push("removal durations must be >= 0".into());
        }
        if r.burst_batches == 0 {
            w.push("removal.burst_batches is 0; treated as 1".into());
        }
        let lin = &self.gesture.linear;
        if lin.rate <= 0.0 {
            w.push(format!("gesture.linear.rate {} must be > 0 to make progress", lin.rate));
        }
        if lin.deadzone < 0.0 {
            w.push("gesture.linear.deadzone negative; treated as 0".into());
        }
        let rot = &self.gesture.rotary;
        if rot.max_multiplier < rot.base_multiplier {
            w.push(format!(
                "gesture.rotary.max_multiplier {} below base_multiplier {}; clamped",
                rot.max_multiplier, rot.base_multiplier
            ));
        }
        if rot.revolutions_per_unit <= 0.0 {
            w.push("gesture.rotary.revolutions_per_unit must be > 0".into());
        }
        if rot.energy_per_degree <= 0.0 && self.gesture.mode == GestureMode::Rotary {
            w.push("gesture.rotary.energy_per_degree must be > 0 in Rotary mode".into());
        }
        for (label, slot) in [
            ("retiring", &self.conveyor.retiring),
            ("active", &self.conveyor.active),
            ("queued", &self.conveyor.queued),
        ] {
            if slot.scale <= 0.0 {
                w.push(format!("conveyor.{label}.scale {} must be > 0", slot.scale));
            }
        }
        if self.conveyor.queued.scale > self.conveyor.active.scale {
            w.push("conveyor.queued.scale larger than active; queued hive will shrink on promotion".into());
        }
        if self.conveyor.transition_duration < 0.0 {
            w.push("conveyor.transition_duration negative; treated as 0".into());
        }
        if self.brush.radius <= 0.0 {
            w.push("brush.radius must be > 0; no contacts will register".into());
        }
        if self.session.time_limit < 0.0 {
            w.push("session.time_limit negative; timer disabled".into());
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_clean() {
        let warnings = GameConfig::default().validate();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn inverted_ranges_are_reported() {
        let mut cfg = GameConfig::default();
        cfg.hive.final_floor = SpawnRange { min: 8, max: 5 };
        cfg.hive.hits_required = SpawnRange { min: 0, max: 2 };
        let joined = cfg.validate().join("\n");
        assert!(joined.contains("hive.final_floor min (8) greater than max (5)"));
        assert!(joined.contains("hits_required.min is 0"));
    }

    #[test]
    fn tiny_step_fraction_is_reported() {
        let mut cfg = GameConfig::default();
        cfg.hive.step_fraction = 1e-8;
        let joined = cfg.validate().join("\n");
        assert!(joined.contains("hive.step_fraction"), "{joined}");
    }

    #[test]
    fn parses_partial_ron() {
        let cfg: GameConfig = ron::from_str(
            "(hive: (members: 12, final_floor: (min: 6, max: 6)), gesture: (mode: Rotary))",
        )
        .expect("parse");
        assert_eq!(cfg.hive.members, 12);
        assert_eq!(cfg.hive.final_floor, SpawnRange { min: 6, max: 6 });
        assert_eq!(cfg.hive.threshold, 100.0);
        assert_eq!(cfg.gesture.mode, GestureMode::Rotary);
    }
}
