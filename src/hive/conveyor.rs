//! Three-slot hive sequencing: one retiring, one active, one queued.
//!
//! Only the active hive takes energy and contacts. When it turns Complete the
//! conveyor advances exactly once: active slides out to the retiring slot and is
//! destroyed when it arrives, queued is promoted, and a fresh hive is spawned in
//! the queued slot.

use bevy::log::{debug, info};
use bevy::math::Vec2;
use rand::Rng;

use crate::core::config::{ConveyorConfig, SlotConfig};

use super::container::{Container, Phase};
use super::events::HiveEvent;
use super::member::HitOutcome;
use super::params::HiveParams;
use super::{HiveId, IdSeq, MemberId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRole {
    Retiring,
    Active,
    Queued,
}

/// Position + uniform scale of a slot or hive anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotTransform {
    pub position: Vec2,
    pub scale: f32,
}

impl SlotTransform {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(to.position, t),
            scale: self.scale + (to.scale - self.scale) * t,
        }
    }
}

impl From<&SlotConfig> for SlotTransform {
    fn from(s: &SlotConfig) -> Self {
        Self {
            position: Vec2::new(s.x, s.y),
            scale: s.scale.max(0.0),
        }
    }
}

/// Linear move between two slot transforms.
#[derive(Debug, Clone)]
pub struct SlotTransition {
    from: SlotTransform,
    to: SlotTransform,
    elapsed: f32,
    duration: f32,
}

impl SlotTransition {
    pub fn new(from: SlotTransform, to: SlotTransform, duration: f32) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    pub fn tick(&mut self, dt: f32) -> SlotTransform {
        self.elapsed += dt.max(0.0);
        if self.is_done() {
            return self.to;
        }
        self.from.lerp(self.to, self.elapsed / self.duration)
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotLayout {
    pub retiring: SlotTransform,
    pub active: SlotTransform,
    pub queued: SlotTransform,
    pub transition_duration: f32,
}

impl SlotLayout {
    pub fn from_config(cfg: &ConveyorConfig) -> Self {
        Self {
            retiring: (&cfg.retiring).into(),
            active: (&cfg.active).into(),
            queued: (&cfg.queued).into(),
            transition_duration: cfg.transition_duration.max(0.0),
        }
    }
}

impl Default for SlotLayout {
    fn default() -> Self {
        Self::from_config(&ConveyorConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct ConveyorManager {
    params: HiveParams,
    layout: SlotLayout,
    active: Container,
    queued: Container,
    retiring: Option<Container>,
    hive_ids: IdSeq,
    member_ids: IdSeq,
    completed: u32,
    last_seen: Phase,
    events: Vec<HiveEvent>,
}

impl ConveyorManager {
    pub fn new<R: Rng + ?Sized>(params: HiveParams, layout: SlotLayout, rng: &mut R) -> Self {
        let mut hive_ids = IdSeq::default();
        let mut member_ids = IdSeq::default();
        let active = spawn(&params, layout.active, &mut hive_ids, &mut member_ids, rng);
        let queued = spawn(&params, layout.queued, &mut hive_ids, &mut member_ids, rng);
        Self {
            params,
            layout,
            active,
            queued,
            retiring: None,
            hive_ids,
            member_ids,
            completed: 0,
            last_seen: Phase::Accumulating,
            events: Vec::new(),
        }
    }

    pub fn active(&self) -> &Container {
        &self.active
    }
    pub fn active_mut(&mut self) -> &mut Container {
        &mut self.active
    }
    pub fn queued(&self) -> &Container {
        &self.queued
    }
    pub fn retiring(&self) -> Option<&Container> {
        self.retiring.as_ref()
    }
    pub fn completed(&self) -> u32 {
        self.completed
    }
    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }
    pub fn params(&self) -> &HiveParams {
        &self.params
    }

    /// Every live container with its logical slot, back to front.
    pub fn containers(&self) -> impl Iterator<Item = (SlotRole, &Container)> {
        self.retiring
            .iter()
            .map(|c| (SlotRole::Retiring, c))
            .chain(std::iter::once((SlotRole::Queued, &self.queued)))
            .chain(std::iter::once((SlotRole::Active, &self.active)))
    }

    pub fn feed_energy<R: Rng + ?Sized>(&mut self, amount: f32, rng: &mut R) -> bool {
        self.active.add_energy(amount, rng)
    }

    /// Contacts are only honored for members of the active hive.
    pub fn contact<R: Rng + ?Sized>(&mut self, member: MemberId, rng: &mut R) -> HitOutcome {
        if self.active.member(member).is_none() {
            debug!("contact on {} outside the active hive ignored", member);
            return HitOutcome::Ignored;
        }
        self.active.contact(member, rng)
    }

    /// Advance animations and transitions, then watch for the Complete edge.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.active.tick(dt);
        self.queued.tick(dt);
        if let Some(old) = self.retiring.as_mut() {
            old.tick(dt);
        }
        // Slid out and every exit animation played.
        if self
            .retiring
            .as_ref()
            .is_some_and(|c| !c.is_transitioning() && c.pending_removals() == 0)
        {
            self.destroy_retiring();
        }

        let phase = self.active.phase();
        if phase == Phase::Complete && self.last_seen != Phase::Complete {
            self.advance(rng);
        } else {
            self.last_seen = phase;
        }
        self.collect_events();
    }

    /// Rotate the slots. Only valid while the active hive is Complete; returns
    /// whether anything moved.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.active.phase() != Phase::Complete {
            return false;
        }
        self.collect_events();
        self.completed += 1;
        let done = self.active.id();
        info!("{} complete, {} so far; advancing conveyor", done, self.completed);
        self.events.push(HiveEvent::HiveCompleted {
            hive: done,
            total: self.completed,
        });

        if self.retiring.is_some() {
            self.destroy_retiring();
        }

        let fresh = spawn(
            &self.params,
            self.layout.queued,
            &mut self.hive_ids,
            &mut self.member_ids,
            rng,
        );
        let promoted = std::mem::replace(&mut self.queued, fresh);
        let mut finished = std::mem::replace(&mut self.active, promoted);
        let duration = self.layout.transition_duration;
        finished.clear_jitter();
        finished.move_to(self.layout.retiring, duration);
        self.active.move_to(self.layout.active, duration);
        self.retiring = Some(finished);
        self.last_seen = self.active.phase();
        true
    }

    fn destroy_retiring(&mut self) {
        if let Some(mut old) = self.retiring.take() {
            old.finish_all_removals();
            self.events.extend(old.drain_events());
            debug!("{} retired", old.id());
            self.events.push(HiveEvent::HiveRetired { hive: old.id() });
        }
    }

    fn collect_events(&mut self) {
        if let Some(old) = self.retiring.as_mut() {
            self.events.extend(old.drain_events());
        }
        self.events.extend(self.active.drain_events());
        self.events.extend(self.queued.drain_events());
    }

    /// Snap both hives back to their slots, drop the retiring one and repopulate.
    /// In-flight animations are cancelled without `MemberRemoved` events.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.collect_events();
        self.retiring = None;
        for (c, slot) in [
            (&mut self.active, self.layout.active),
            (&mut self.queued, self.layout.queued),
        ] {
            let floor = pick_floor(&self.params, rng);
            c.reset(floor, slot);
            c.populate(&mut self.member_ids, rng);
            c.drain_events();
        }
        self.completed = 0;
        self.last_seen = Phase::Accumulating;
        info!("conveyor reset");
    }

    /// New tuning for hives spawned from now on.
    pub fn apply_params(&mut self, params: HiveParams, layout: SlotLayout) {
        self.params = params;
        self.layout = layout;
    }

    pub fn drain_events(&mut self) -> Vec<HiveEvent> {
        self.collect_events();
        std::mem::take(&mut self.events)
    }
}

fn pick_floor<R: Rng + ?Sized>(params: &HiveParams, rng: &mut R) -> u32 {
    if params.final_floor.is_empty() {
        *params.final_floor.start()
    } else {
        rng.gen_range(params.final_floor.clone())
    }
}

fn spawn<R: Rng + ?Sized>(
    params: &HiveParams,
    slot: SlotTransform,
    hive_ids: &mut IdSeq,
    member_ids: &mut IdSeq,
    rng: &mut R,
) -> Container {
    let id = HiveId(hive_ids.next_id());
    let floor = pick_floor(params, rng);
    let mut c = Container::new(id, params, floor, slot);
    c.populate(member_ids, rng);
    c
}
