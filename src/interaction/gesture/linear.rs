use bevy::log::debug;
use bevy::math::Vec2;
use rand::{Rng, RngCore};
use std::f32::consts::TAU;

use super::{GestureGate, GestureOutput, Jitter, PointerInput};
use crate::hive::params::LinearParams;

/// Vertical shake: press inside the hive, then move up and down.
#[derive(Debug, Clone)]
pub struct LinearDrag {
    params: LinearParams,
    dragging: bool,
    was_pressed: bool,
    last_y: f32,
}

impl LinearDrag {
    pub fn new(params: LinearParams) -> Self {
        Self {
            params,
            dragging: false,
            was_pressed: false,
            last_y: 0.0,
        }
    }

    pub fn set_params(&mut self, params: LinearParams) {
        self.params = params;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn cancel(&mut self) -> Jitter {
        if self.dragging {
            self.dragging = false;
            debug!(target: "hive_gesture", "shake ended");
            Jitter::Clear
        } else {
            Jitter::Keep
        }
    }

    pub fn update(
        &mut self,
        input: PointerInput,
        gate: GestureGate,
        dt: f32,
        rng: &mut dyn RngCore,
    ) -> GestureOutput {
        let fresh_press = input.pressed && !self.was_pressed;
        self.was_pressed = input.pressed;

        let pos = match input.position {
            Some(p) if input.pressed && gate.open => p,
            _ => {
                return GestureOutput {
                    jitter: self.cancel(),
                    ..Default::default()
                }
            }
        };

        if !self.dragging {
            if fresh_press && gate.bounds.contains(pos) {
                self.dragging = true;
                self.last_y = pos.y;
                debug!(target: "hive_gesture", "shake started at {:?}", pos);
            }
            return GestureOutput::default();
        }

        let dy = pos.y - self.last_y;
        self.last_y = pos.y;
        if dy.abs() <= self.params.deadzone {
            return GestureOutput::default();
        }
        GestureOutput {
            energy: self.params.rate * dt,
            jitter: Jitter::Set(random_in_circle(rng) * self.params.shake_intensity),
            unit_completed: None,
        }
    }
}

fn random_in_circle(rng: &mut dyn RngCore) -> Vec2 {
    let angle = rng.gen_range(0.0..TAU);
    let radius = rng.gen::<f32>().sqrt();
    Vec2::from_angle(angle) * radius
}
