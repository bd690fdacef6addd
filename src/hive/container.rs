//! A single hive: its members, depletion schedule and phase state machine.
//!
//! Progress only grows while `Accumulating`. Every crossed step boundary runs one
//! decay step that pulls the live count toward a linear target ending at the
//! container's final floor. Reaching the threshold bursts whatever surplus is left
//! and flips the hive to `Finishing`, where members leave only through contacts.
//! The first time the live count hits zero while finishing the hive turns `Complete`.

use bevy::log::{debug, info};
use bevy::math::{Rect, Vec2};
use rand::seq::index;
use rand::Rng;
use std::collections::BTreeMap;
use std::f32::consts::TAU;

use super::conveyor::{SlotTransform, SlotTransition};
use super::events::{HiveEvent, RemovalCause};
use super::member::{HitOutcome, Member, MemberState};
use super::params::HiveParams;
use super::removal::{RemovalAnimation, RemovalAnimator, RemovalPose};
use super::{HiveId, IdSeq, MemberId};

/// Slack on boundary crossings, relative to the step size.
const BOUNDARY_SLACK: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Accumulating,
    Finishing,
    Complete,
}

impl Phase {
    pub fn accepts_energy(self) -> bool {
        self == Phase::Accumulating
    }
    pub fn accepts_contact(self) -> bool {
        self == Phase::Finishing
    }
}

/// World-space pose of a member for presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberPose {
    pub position: Vec2,
    pub opacity: f32,
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct Container {
    id: HiveId,
    params: HiveParams,
    final_floor: u32,
    members: BTreeMap<MemberId, Member>,
    progress: f32,
    steps_done: u32,
    excess_at_start: u32,
    phase: Phase,
    anchor: SlotTransform,
    jitter: Vec2,
    transition: Option<SlotTransition>,
    animator: RemovalAnimator,
    events: Vec<HiveEvent>,
}

impl Container {
    pub fn new(id: HiveId, params: &HiveParams, final_floor: u32, anchor: SlotTransform) -> Self {
        Self {
            id,
            params: params.clone(),
            final_floor,
            members: BTreeMap::new(),
            progress: 0.0,
            steps_done: 0,
            excess_at_start: 0,
            phase: Phase::Accumulating,
            anchor,
            jitter: Vec2::ZERO,
            transition: None,
            animator: RemovalAnimator::default(),
            events: Vec::new(),
        }
    }

    /// Scatter `params.members` members around the anchor at its current scale.
    pub fn populate<R: Rng + ?Sized>(&mut self, ids: &mut IdSeq, rng: &mut R) {
        let scale = self.anchor.scale;
        let points = self.params.placement().scatter(self.params.members, scale, rng);
        self.populate_at(&points, ids, rng);
    }

    /// Add members at explicit positions (scaled offsets from the anchor).
    pub fn populate_at<R: Rng + ?Sized>(&mut self, points: &[Vec2], ids: &mut IdSeq, rng: &mut R) {
        let scale = if self.anchor.scale > f32::EPSILON {
            self.anchor.scale
        } else {
            1.0
        };
        for p in points {
            let id = MemberId(ids.next_id());
            let member = Member::with_random_hits(
                id,
                self.id,
                *p / scale,
                self.params.hits_required.clone(),
                rng,
            );
            self.members.insert(id, member);
        }
        if self.phase == Phase::Accumulating && self.progress == 0.0 {
            self.excess_at_start = (self.live_count() as u32).saturating_sub(self.final_floor);
        }
        debug!(
            "{}: populated {} members, floor {}, excess {}",
            self.id,
            points.len(),
            self.final_floor,
            self.excess_at_start
        );
    }

    pub fn id(&self) -> HiveId {
        self.id
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn progress(&self) -> f32 {
        self.progress
    }
    pub fn threshold(&self) -> f32 {
        self.params.threshold
    }
    pub fn final_floor(&self) -> u32 {
        self.final_floor
    }
    pub fn params(&self) -> &HiveParams {
        &self.params
    }

    pub fn progress_fraction(&self) -> f32 {
        (self.progress / self.params.threshold).clamp(0.0, 1.0)
    }

    /// Members still Active. Removing members are on their way out and do not count.
    pub fn live_count(&self) -> usize {
        self.members.values().filter(|m| m.is_active()).count()
    }

    /// Every member still owned, including those mid-animation.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn pending_removals(&self) -> usize {
        self.animator.len()
    }

    /// Feed energy. Returns false when the phase refuses it or the amount is not positive.
    pub fn add_energy<R: Rng + ?Sized>(&mut self, amount: f32, rng: &mut R) -> bool {
        if !self.phase.accepts_energy() {
            debug!(target: "hive_depletion", "{}: energy ignored in {:?}", self.id, self.phase);
            return false;
        }
        if !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        let threshold = self.params.threshold;
        self.progress = (self.progress + amount).min(threshold);
        if self.progress >= threshold * (1.0 - 1e-5) {
            self.progress = threshold;
        }

        let step = self.params.step_size();
        let steps = self.params.step_count();
        while self.steps_done < steps {
            let boundary = (self.steps_done + 1) as f32 * step;
            if boundary > self.progress + step * BOUNDARY_SLACK {
                break;
            }
            self.steps_done += 1;
            self.decay_step(boundary, rng);
        }

        if self.progress >= threshold {
            self.finish_accumulating(rng);
        }
        true
    }

    fn decay_step<R: Rng + ?Sized>(&mut self, boundary: f32, rng: &mut R) {
        let floor = self.final_floor as usize;
        let live = self.live_count();
        if live <= floor || self.excess_at_start == 0 {
            return;
        }
        let excess = self.excess_at_start as f32;
        let remaining_ratio = (1.0 - boundary / self.params.threshold).clamp(0.0, 1.0);
        let target = (excess * remaining_ratio).round() as usize + floor;
        let cap = ((excess / self.params.step_count() as f32).ceil() as usize).max(1);
        let to_remove = live.saturating_sub(target).min(cap).min(live - floor);
        debug!(
            target: "hive_depletion",
            "{}: boundary {:.2} live {} target {} removing {}",
            self.id, boundary, live, target, to_remove
        );
        for id in self.pick_active(to_remove, rng) {
            self.start_removal(id, RemovalCause::Shaken, 0.0, rng);
        }
    }

    fn finish_accumulating<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let floor = self.final_floor as usize;
        let live = self.live_count();
        if live > floor {
            let surplus = live - floor;
            let batch = (surplus / self.params.burst_batches.max(1) as usize).max(1);
            debug!(
                target: "hive_depletion",
                "{}: burst of {} in batches of {}",
                self.id, surplus, batch
            );
            for (i, id) in self.pick_active(surplus, rng).into_iter().enumerate() {
                let delay = (i / batch) as f32 * self.params.burst_interval;
                self.start_removal(id, RemovalCause::Burst, delay, rng);
            }
        }
        self.set_phase(Phase::Finishing);
        self.check_complete();
    }

    /// Uniform selection without replacement from the Active pool.
    fn pick_active<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<MemberId> {
        let pool: Vec<MemberId> = self
            .members
            .values()
            .filter(|m| m.is_active())
            .map(|m| m.id())
            .collect();
        let count = count.min(pool.len());
        if count == 0 {
            return Vec::new();
        }
        index::sample(rng, pool.len(), count)
            .into_iter()
            .map(|i| pool[i])
            .collect()
    }

    fn start_removal<R: Rng + ?Sized>(
        &mut self,
        id: MemberId,
        cause: RemovalCause,
        delay: f32,
        rng: &mut R,
    ) {
        let Some(member) = self.members.get_mut(&id) else {
            return;
        };
        if !member.begin_removal() {
            return;
        }
        let start = member.position;
        self.launch_exit(id, start, cause, delay, rng);
    }

    fn launch_exit<R: Rng + ?Sized>(
        &mut self,
        id: MemberId,
        start: Vec2,
        cause: RemovalCause,
        delay: f32,
        rng: &mut R,
    ) {
        let scale = self.anchor.scale.max(f32::EPSILON);
        let dir = Vec2::from_angle(rng.gen_range(0.0..TAU));
        let offset = dir * self.params.removal_distance / scale;
        self.animator.animate(
            RemovalAnimation::new(id, start, offset, self.params.removal_duration)
                .with_delay(delay),
        );
        self.events.push(HiveEvent::MemberDeparting {
            hive: self.id,
            member: id,
            cause,
        });
    }

    /// Contact against one of this hive's members (brush hit).
    pub fn contact<R: Rng + ?Sized>(&mut self, id: MemberId, rng: &mut R) -> HitOutcome {
        let allowed = self.phase.accepts_contact();
        let Some(member) = self.members.get_mut(&id) else {
            debug!("{}: contact on unknown {}", self.id, id);
            return HitOutcome::Ignored;
        };
        let outcome = member.register_hit(allowed);
        match outcome {
            HitOutcome::Triggered => {
                let start = member.position;
                self.launch_exit(id, start, RemovalCause::Brushed, 0.0, rng);
                self.check_complete();
            }
            HitOutcome::Ignored if !allowed => {
                debug!("{}: contact ignored in {:?}", self.id, self.phase);
            }
            _ => {}
        }
        outcome
    }

    fn set_phase(&mut self, to: Phase) {
        if self.phase == to {
            return;
        }
        let from = self.phase;
        self.phase = to;
        info!("{}: {:?} -> {:?}", self.id, from, to);
        self.events.push(HiveEvent::PhaseChanged {
            hive: self.id,
            from,
            to,
        });
    }

    fn check_complete(&mut self) {
        if self.phase == Phase::Finishing && self.live_count() == 0 {
            self.set_phase(Phase::Complete);
        }
    }

    /// Advance removal animations and any slot transition.
    pub fn tick(&mut self, dt: f32) {
        for id in self.animator.tick(dt) {
            self.drop_member(id);
        }
        if let Some(tr) = self.transition.as_mut() {
            self.anchor = tr.tick(dt);
            if tr.is_done() {
                self.transition = None;
            }
        }
    }

    fn drop_member(&mut self, id: MemberId) {
        if let Some(mut m) = self.members.remove(&id) {
            m.finish_removal();
            self.events.push(HiveEvent::MemberRemoved {
                hive: self.id,
                member: id,
            });
        }
    }

    /// External destruction of a member. Removing members skip the rest of their
    /// animation; Active ones are dropped on the spot.
    pub fn despawn_member(&mut self, id: MemberId) -> bool {
        let Some(member) = self.members.get_mut(&id) else {
            return false;
        };
        match member.state() {
            MemberState::Removing => {
                self.animator.abort(id);
                self.drop_member(id);
            }
            MemberState::Active => {
                member.begin_removal();
                self.drop_member(id);
                self.check_complete();
            }
            MemberState::Removed => return false,
        }
        true
    }

    /// Jump every in-flight removal to its end and drop those members.
    pub fn finish_all_removals(&mut self) {
        for id in self.animator.finish_all() {
            self.drop_member(id);
        }
    }

    /// Back to an empty Accumulating hive. Animations are cancelled silently.
    pub fn reset(&mut self, final_floor: u32, anchor: SlotTransform) {
        self.animator.cancel_all();
        self.members.clear();
        self.final_floor = final_floor;
        self.progress = 0.0;
        self.steps_done = 0;
        self.excess_at_start = 0;
        self.phase = Phase::Accumulating;
        self.anchor = anchor;
        self.jitter = Vec2::ZERO;
        self.transition = None;
    }

    pub fn anchor(&self) -> SlotTransform {
        self.anchor
    }

    /// Anchor including the cosmetic shake offset.
    pub fn visual_anchor(&self) -> SlotTransform {
        SlotTransform {
            position: self.anchor.position + self.jitter,
            scale: self.anchor.scale,
        }
    }

    pub fn jitter(&self) -> Vec2 {
        self.jitter
    }
    pub fn set_jitter(&mut self, offset: Vec2) {
        self.jitter = offset;
    }
    pub fn clear_jitter(&mut self) {
        self.jitter = Vec2::ZERO;
    }

    pub fn move_to(&mut self, target: SlotTransform, duration: f32) {
        if duration <= 0.0 {
            self.snap_to(target);
        } else {
            self.transition = Some(SlotTransition::new(self.anchor, target, duration));
        }
    }

    pub fn snap_to(&mut self, target: SlotTransform) {
        self.anchor = target;
        self.transition = None;
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// World-space rectangle covered by the hive at its current anchor.
    pub fn bounds(&self) -> Rect {
        let a = self.visual_anchor();
        Rect::from_center_size(a.position, self.params.area * a.scale)
    }

    pub fn member_pose(&self, id: MemberId) -> Option<MemberPose> {
        let member = self.members.get(&id)?;
        let local = self
            .animator
            .pose(id)
            .unwrap_or_else(|| RemovalPose::at_rest(member.position));
        let a = self.visual_anchor();
        Some(MemberPose {
            position: a.position + local.position * a.scale,
            opacity: local.opacity,
            scale: local.scale * a.scale,
        })
    }

    pub fn drain_events(&mut self) -> Vec<HiveEvent> {
        std::mem::take(&mut self.events)
    }
}
