//! Root driver: one conveyor, one gesture tracker, the round timer and the RNG.
//!
//! Per tick the order is fixed: gesture sampling, energy into the active hive (which
//! runs its depletion steps), animation advancement, then conveyor edge detection.

use bevy::log::info;
use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::core::config::{GameConfig, GestureMode};
use crate::interaction::gesture::{GestureGate, GestureTracker, Jitter, PointerInput};

use super::container::Phase;
use super::conveyor::{ConveyorManager, SlotLayout};
use super::events::HiveEvent;
use super::member::HitOutcome;
use super::params::{GestureParams, HiveParams};
use super::{HiveId, MemberId};

pub type SessionRng = Box<dyn RngCore + Send + Sync>;

/// Read-only snapshot for UI and logging.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct HiveProgress {
    pub hive: HiveId,
    pub fraction: f32,
    pub phase: Phase,
    pub live_members: usize,
    pub completed: u32,
    /// None when the round timer is disabled.
    pub time_remaining: Option<f32>,
    pub ended: bool,
    pub blocked: bool,
    pub mode: GestureMode,
    pub momentum: Option<f32>,
    pub crank_units: u32,
}

impl Default for HiveProgress {
    fn default() -> Self {
        Self {
            hive: HiveId(0),
            fraction: 0.0,
            phase: Phase::Accumulating,
            live_members: 0,
            completed: 0,
            time_remaining: None,
            ended: false,
            blocked: false,
            mode: GestureMode::default(),
            momentum: None,
            crank_units: 0,
        }
    }
}

#[derive(Resource)]
pub struct HiveSession {
    conveyor: ConveyorManager,
    gesture: GestureTracker,
    gesture_params: GestureParams,
    rng: SessionRng,
    blocked: bool,
    time_limit: f32,
    elapsed: f32,
    ended: bool,
    events: Vec<HiveEvent>,
}

impl HiveSession {
    /// Seeded from `session.seed` when present, entropy otherwise.
    pub fn new(cfg: &GameConfig) -> Self {
        let rng: SessionRng = match cfg.session.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        };
        Self::with_rng(cfg, rng)
    }

    pub fn with_rng(cfg: &GameConfig, mut rng: SessionRng) -> Self {
        let conveyor = ConveyorManager::new(
            HiveParams::from_config(cfg),
            SlotLayout::from_config(&cfg.conveyor),
            rng.as_mut(),
        );
        let gesture_params = GestureParams::from_config(cfg);
        Self {
            conveyor,
            gesture: GestureTracker::from_params(&gesture_params),
            gesture_params,
            rng,
            blocked: false,
            time_limit: cfg.session.time_limit.max(0.0),
            elapsed: 0.0,
            ended: false,
            events: Vec::new(),
        }
    }

    pub fn conveyor(&self) -> &ConveyorManager {
        &self.conveyor
    }
    pub fn gesture(&self) -> &GestureTracker {
        &self.gesture
    }
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
    pub fn is_ended(&self) -> bool {
        self.ended
    }
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn accepts_input(&self) -> bool {
        !self.blocked && !self.ended
    }

    pub fn tick(&mut self, dt: f32, input: PointerInput) {
        let dt = dt.max(0.0);
        self.advance_timer(dt);

        let active = self.conveyor.active();
        let gate = GestureGate {
            open: self.accepts_input() && active.phase().accepts_energy(),
            bounds: active.bounds(),
        };
        let out = self.gesture.update(input, gate, dt, self.rng.as_mut());
        self.apply_jitter(out.jitter);
        if out.energy > 0.0 {
            self.conveyor.feed_energy(out.energy, self.rng.as_mut());
        }
        if let Some(units) = out.unit_completed {
            self.events.push(HiveEvent::CrankUnitCompleted { units });
        }

        self.conveyor.tick(dt, self.rng.as_mut());
        self.events.extend(self.conveyor.drain_events());
    }

    fn advance_timer(&mut self, dt: f32) {
        if self.ended || self.time_limit <= 0.0 {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.time_limit {
            self.ended = true;
            let jitter = self.gesture.cancel();
            self.apply_jitter(jitter);
            let completed = self.conveyor.completed();
            info!("round over: {} hives completed", completed);
            self.events.push(HiveEvent::SessionEnded { completed });
        }
    }

    fn apply_jitter(&mut self, jitter: Jitter) {
        match jitter {
            Jitter::Keep => {}
            Jitter::Set(offset) => self.conveyor.active_mut().set_jitter(offset),
            Jitter::Clear => self.conveyor.active_mut().clear_jitter(),
        }
    }

    /// Brush contact against a member of the active hive.
    pub fn contact(&mut self, member: MemberId) -> HitOutcome {
        if !self.accepts_input() {
            return HitOutcome::Ignored;
        }
        self.conveyor.contact(member, self.rng.as_mut())
    }

    pub fn set_blocked(&mut self, blocked: bool) {
        if self.blocked == blocked {
            return;
        }
        self.blocked = blocked;
        info!("gameplay {}", if blocked { "blocked" } else { "unblocked" });
        if blocked {
            let jitter = self.gesture.cancel();
            self.apply_jitter(jitter);
        }
    }

    /// Fresh round: new hives, timer restarted, gesture state dropped. No events.
    pub fn reset(&mut self) {
        self.conveyor.reset(self.rng.as_mut());
        self.events.extend(self.conveyor.drain_events());
        self.gesture = GestureTracker::from_params(&self.gesture_params);
        self.elapsed = 0.0;
        self.ended = false;
        info!("session reset");
    }

    /// Retune after a config change. Hives already on the conveyor keep their
    /// spawn-time parameters.
    pub fn apply_config(&mut self, cfg: &GameConfig) {
        self.conveyor.apply_params(
            HiveParams::from_config(cfg),
            SlotLayout::from_config(&cfg.conveyor),
        );
        self.gesture_params = GestureParams::from_config(cfg);
        self.gesture.apply_params(&self.gesture_params);
        self.time_limit = cfg.session.time_limit.max(0.0);
    }

    pub fn progress(&self) -> HiveProgress {
        let active = self.conveyor.active();
        let crank = self.gesture.as_rotary();
        HiveProgress {
            hive: active.id(),
            fraction: active.progress_fraction(),
            phase: active.phase(),
            live_members: active.live_count(),
            completed: self.conveyor.completed(),
            time_remaining: (self.time_limit > 0.0)
                .then(|| (self.time_limit - self.elapsed).max(0.0)),
            ended: self.ended,
            blocked: self.blocked,
            mode: self.gesture.mode(),
            momentum: crank.map(|c| c.momentum_multiplier()),
            crank_units: crank.map_or(0, |c| c.units()),
        }
    }

    pub fn drain_events(&mut self) -> Vec<HiveEvent> {
        std::mem::take(&mut self.events)
    }
}
