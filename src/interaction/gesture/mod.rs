//! Pointer gestures that turn into hive energy.
//!
//! Two mappings share one interface: a vertical shake over the active hive
//! ([`linear::LinearDrag`]) and a crank around a fixed pivot ([`rotary::RotaryCrank`]).
//! Both are pure state machines fed one [`PointerInput`] per tick.

pub mod linear;
pub mod rotary;

use bevy::math::{Rect, Vec2};
use rand::RngCore;

use crate::core::config::GestureMode;
use crate::hive::params::GestureParams;

pub use linear::LinearDrag;
pub use rotary::RotaryCrank;

/// Pointer sample in scene coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerInput {
    pub position: Option<Vec2>,
    pub pressed: bool,
}

impl PointerInput {
    pub fn pressed_at(position: Vec2) -> Self {
        Self {
            position: Some(position),
            pressed: true,
        }
    }

    pub fn hover(position: Vec2) -> Self {
        Self {
            position: Some(position),
            pressed: false,
        }
    }

    pub fn released() -> Self {
        Self::default()
    }
}

/// What the active hive allows this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureGate {
    /// False while blocked or while the active hive refuses energy.
    pub open: bool,
    /// World bounds of the active hive, where linear drags may start.
    pub bounds: Rect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Jitter {
    #[default]
    Keep,
    Set(Vec2),
    Clear,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureOutput {
    pub energy: f32,
    pub jitter: Jitter,
    /// Total crank units, present only on the tick a unit completed.
    pub unit_completed: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum GestureTracker {
    Linear(LinearDrag),
    Rotary(RotaryCrank),
}

impl GestureTracker {
    pub fn from_params(params: &GestureParams) -> Self {
        match params.mode {
            GestureMode::Linear => Self::Linear(LinearDrag::new(params.linear.clone())),
            GestureMode::Rotary => Self::Rotary(RotaryCrank::new(params.rotary.clone())),
        }
    }

    pub fn mode(&self) -> GestureMode {
        match self {
            Self::Linear(_) => GestureMode::Linear,
            Self::Rotary(_) => GestureMode::Rotary,
        }
    }

    pub fn update(
        &mut self,
        input: PointerInput,
        gate: GestureGate,
        dt: f32,
        rng: &mut dyn RngCore,
    ) -> GestureOutput {
        match self {
            Self::Linear(t) => t.update(input, gate, dt, rng),
            Self::Rotary(t) => t.update(input, gate, dt),
        }
    }

    pub fn is_dragging(&self) -> bool {
        match self {
            Self::Linear(t) => t.is_dragging(),
            Self::Rotary(t) => t.is_dragging(),
        }
    }

    /// Swap tuning in place; a mode change starts a fresh tracker.
    pub fn apply_params(&mut self, params: &GestureParams) {
        match (self, params.mode) {
            (Self::Linear(t), GestureMode::Linear) => t.set_params(params.linear.clone()),
            (Self::Rotary(t), GestureMode::Rotary) => t.set_params(params.rotary.clone()),
            (this, _) => *this = Self::from_params(params),
        }
    }

    /// Drop any in-progress drag. Returns the jitter command to apply.
    pub fn cancel(&mut self) -> Jitter {
        match self {
            Self::Linear(t) => t.cancel(),
            Self::Rotary(t) => {
                t.cancel();
                Jitter::Keep
            }
        }
    }

    pub fn as_rotary(&self) -> Option<&RotaryCrank> {
        match self {
            Self::Rotary(t) => Some(t),
            Self::Linear(_) => None,
        }
    }
}
