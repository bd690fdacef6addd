use bevy::log::{debug, info};
use bevy::math::Vec2;

use super::{GestureGate, GestureOutput, PointerInput};
use crate::hive::params::RotaryParams;

/// Crank around a fixed pivot. Sustained rotation in one direction builds momentum
/// that multiplies the energy per degree; reversing drops it back to base at once.
#[derive(Debug, Clone)]
pub struct RotaryCrank {
    params: RotaryParams,
    dragging: bool,
    was_pressed: bool,
    last_dir: Vec2,
    last_sign: f32,
    continuous_time: f32,
    multiplier: f32,
    total_rotation: f32,
    unit_rotation: f32,
    units: u32,
    handle_angle: f32,
}

impl RotaryCrank {
    pub fn new(params: RotaryParams) -> Self {
        let multiplier = params.base_multiplier;
        Self {
            params,
            dragging: false,
            was_pressed: false,
            last_dir: Vec2::ZERO,
            last_sign: 0.0,
            continuous_time: 0.0,
            multiplier,
            total_rotation: 0.0,
            unit_rotation: 0.0,
            units: 0,
            handle_angle: 0.0,
        }
    }

    pub fn set_params(&mut self, params: RotaryParams) {
        self.params = params;
        self.multiplier = self
            .multiplier
            .clamp(self.params.base_multiplier, self.params.max_multiplier);
    }

    pub fn params(&self) -> &RotaryParams {
        &self.params
    }
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
    pub fn momentum_multiplier(&self) -> f32 {
        self.multiplier
    }
    /// Effective (momentum scaled) rotation in degrees since creation.
    pub fn total_rotation(&self) -> f32 {
        self.total_rotation
    }
    pub fn revolutions(&self) -> f32 {
        self.total_rotation / 360.0
    }
    pub fn units(&self) -> u32 {
        self.units
    }
    /// Raw handle angle in degrees, for drawing the crank arm.
    pub fn handle_angle(&self) -> f32 {
        self.handle_angle
    }

    pub fn cancel(&mut self) {
        if self.dragging {
            debug!(target: "hive_gesture", "crank released");
        }
        self.dragging = false;
        self.last_sign = 0.0;
    }

    pub fn update(&mut self, input: PointerInput, gate: GestureGate, dt: f32) -> GestureOutput {
        let fresh_press = input.pressed && !self.was_pressed;
        self.was_pressed = input.pressed;

        let pos = match input.position {
            Some(p) if input.pressed && gate.open => p,
            _ => {
                self.cancel();
                self.cool_down(dt);
                return GestureOutput::default();
            }
        };

        let dir = pos - self.params.pivot;
        if !self.dragging {
            if fresh_press && dir.length() <= self.params.grab_radius && dir != Vec2::ZERO {
                self.dragging = true;
                self.last_dir = dir;
                debug!(target: "hive_gesture", "crank grabbed");
            }
            self.cool_down(dt);
            return GestureOutput::default();
        }
        if dir.length_squared() < 1e-6 {
            return GestureOutput::default();
        }

        let angle = self.last_dir.perp_dot(dir).atan2(self.last_dir.dot(dir)).to_degrees();
        self.last_dir = dir;
        if angle.abs() < self.params.min_angle_deg {
            return GestureOutput::default();
        }

        let sign = angle.signum();
        if self.last_sign != 0.0 && sign != self.last_sign {
            self.continuous_time = 0.0;
            self.multiplier = self.params.base_multiplier;
        } else {
            self.continuous_time += dt;
            self.multiplier = self.momentum_for(self.continuous_time);
        }
        self.last_sign = sign;

        let effective = angle.abs() * self.multiplier;
        self.handle_angle += angle;
        self.total_rotation += effective;
        self.unit_rotation += effective;

        let per_unit = self.params.revolutions_per_unit * 360.0;
        let mut unit_completed = None;
        while self.unit_rotation >= per_unit {
            self.unit_rotation -= per_unit;
            self.units += 1;
            unit_completed = Some(self.units);
            info!("crank unit {} complete", self.units);
        }

        GestureOutput {
            energy: effective * self.params.energy_per_degree,
            unit_completed,
            ..Default::default()
        }
    }

    fn momentum_for(&self, t: f32) -> f32 {
        let p = &self.params;
        (p.base_multiplier + t * p.acceleration_rate).clamp(p.base_multiplier, p.max_multiplier)
    }

    fn cool_down(&mut self, dt: f32) {
        self.continuous_time =
            (self.continuous_time - dt * self.params.deceleration_rate).max(0.0);
        self.multiplier = self.momentum_for(self.continuous_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Rect;

    const DT: f32 = 1.0 / 60.0;

    fn params() -> RotaryParams {
        RotaryParams {
            pivot: Vec2::ZERO,
            grab_radius: 100.0,
            base_multiplier: 1.0,
            max_multiplier: 3.0,
            acceleration_rate: 0.5,
            deceleration_rate: 2.0,
            min_angle_deg: 0.1,
            energy_per_degree: 0.05,
            revolutions_per_unit: 20.0,
        }
    }

    fn gate() -> GestureGate {
        GestureGate {
            open: true,
            bounds: Rect::default(),
        }
    }

    fn at(deg: f32) -> PointerInput {
        PointerInput::pressed_at(Vec2::from_angle(deg.to_radians()) * 50.0)
    }

    /// Turn `steps` samples of `step_deg` each, starting from `start`.
    /// Returns the end angle and the energy produced.
    fn turn(c: &mut RotaryCrank, start: f32, step_deg: f32, steps: usize) -> (f32, f32) {
        let mut a = start;
        let mut energy = 0.0;
        for _ in 0..steps {
            a += step_deg;
            energy += c.update(at(a), gate(), DT).energy;
        }
        (a, energy)
    }

    #[test]
    fn grab_needs_press_near_pivot() {
        let mut c = RotaryCrank::new(params());
        c.update(PointerInput::pressed_at(Vec2::new(500.0, 0.0)), gate(), DT);
        assert!(!c.is_dragging());
        c.update(PointerInput::released(), gate(), DT);
        c.update(at(0.0), gate(), DT);
        assert!(c.is_dragging());
    }

    #[test]
    fn sustained_rotation_builds_momentum_and_reversal_resets() {
        let mut c = RotaryCrank::new(params());
        c.update(at(0.0), gate(), DT);
        let (a, _) = turn(&mut c, 0.0, 5.0, 120);
        let m = c.momentum_multiplier();
        assert!((m - 2.0).abs() < 0.05, "multiplier {m}");

        let (a, _) = turn(&mut c, a, 5.0, 240);
        assert_eq!(c.momentum_multiplier(), 3.0);

        turn(&mut c, a, -5.0, 1);
        assert_eq!(c.momentum_multiplier(), 1.0);
    }

    #[test]
    fn energy_is_effective_rotation_times_rate() {
        let mut c = RotaryCrank::new(RotaryParams {
            max_multiplier: 1.0,
            ..params()
        });
        c.update(at(0.0), gate(), DT);
        let (_, energy) = turn(&mut c, 0.0, 10.0, 9);
        assert!((energy - 90.0 * 0.05).abs() < 1e-3);
        assert!((c.total_rotation() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn tiny_angles_are_ignored() {
        let mut c = RotaryCrank::new(params());
        c.update(at(0.0), gate(), DT);
        let out = c.update(at(0.05), gate(), DT);
        assert_eq!(out.energy, 0.0);
    }

    #[test]
    fn momentum_decays_after_release() {
        let mut c = RotaryCrank::new(params());
        c.update(at(0.0), gate(), DT);
        turn(&mut c, 0.0, 5.0, 120);
        assert!(c.momentum_multiplier() > 1.5);
        for _ in 0..40 {
            c.update(PointerInput::released(), gate(), DT);
        }
        assert!(c.momentum_multiplier() < 1.5);
        for _ in 0..60 {
            c.update(PointerInput::released(), gate(), DT);
        }
        assert_eq!(c.momentum_multiplier(), 1.0);
    }

    #[test]
    fn unit_event_after_configured_revolutions() {
        let mut c = RotaryCrank::new(RotaryParams {
            max_multiplier: 1.0,
            revolutions_per_unit: 1.0,
            ..params()
        });
        c.update(at(0.0), gate(), DT);
        let mut a = 0.0;
        let mut units = Vec::new();
        for _ in 0..80 {
            a += 10.0;
            if let Some(u) = c.update(at(a), gate(), DT).unit_completed {
                units.push(u);
            }
        }
        assert_eq!(units, vec![1, 2]);
        assert_eq!(c.units(), 2);
        assert!(c.revolutions() >= 2.0);
    }

    #[test]
    fn closed_gate_releases_crank() {
        let mut c = RotaryCrank::new(params());
        c.update(at(0.0), gate(), DT);
        let closed = GestureGate {
            open: false,
            ..gate()
        };
        let out = c.update(at(10.0), closed, DT);
        assert_eq!(out.energy, 0.0);
        assert!(!c.is_dragging());
    }
}
