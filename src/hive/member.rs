use bevy::math::Vec2;
use rand::Rng;
use std::ops::RangeInclusive;

use super::{HiveId, MemberId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberState {
    Active,
    /// Exit animation in flight; no longer hittable or counted as live.
    Removing,
    Removed,
}

/// Result of a contact against a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Not active, not found, or contact not allowed in the current phase.
    Ignored,
    Counted { hits: u32, required: u32 },
    /// This hit crossed the threshold; the member is now Removing.
    Triggered,
}

/// One depletable entity. Position is local to the owning hive's anchor (unscaled).
#[derive(Debug, Clone)]
pub struct Member {
    id: MemberId,
    owner: HiveId,
    pub position: Vec2,
    hit_count: u32,
    hits_required: u32,
    state: MemberState,
    removal_latched: bool,
}

impl Member {
    pub fn new(id: MemberId, owner: HiveId, position: Vec2, hits_required: u32) -> Self {
        Self {
            id,
            owner,
            position,
            hit_count: 0,
            hits_required: hits_required.max(1),
            state: MemberState::Active,
            removal_latched: false,
        }
    }

    pub fn with_random_hits<R: Rng + ?Sized>(
        id: MemberId,
        owner: HiveId,
        position: Vec2,
        hits: RangeInclusive<u32>,
        rng: &mut R,
    ) -> Self {
        let required = if hits.is_empty() { *hits.start() } else { rng.gen_range(hits) };
        Self::new(id, owner, position, required)
    }

    pub fn id(&self) -> MemberId {
        self.id
    }
    pub fn owner(&self) -> HiveId {
        self.owner
    }
    pub fn hit_count(&self) -> u32 {
        self.hit_count
    }
    pub fn hits_required(&self) -> u32 {
        self.hits_required
    }
    pub fn state(&self) -> MemberState {
        self.state
    }
    pub fn is_active(&self) -> bool {
        self.state == MemberState::Active
    }

    /// Count a contact. `contact_allowed` is the owning hive's phase gate.
    pub fn register_hit(&mut self, contact_allowed: bool) -> HitOutcome {
        if !contact_allowed || self.state != MemberState::Active || self.removal_latched {
            return HitOutcome::Ignored;
        }
        self.hit_count += 1;
        if self.hit_count >= self.hits_required && self.begin_removal() {
            HitOutcome::Triggered
        } else {
            HitOutcome::Counted {
                hits: self.hit_count,
                required: self.hits_required,
            }
        }
    }

    /// Active -> Removing. One-shot: returns false if removal already started.
    pub(crate) fn begin_removal(&mut self) -> bool {
        if self.removal_latched || self.state != MemberState::Active {
            return false;
        }
        self.removal_latched = true;
        self.state = MemberState::Removing;
        true
    }

    pub(crate) fn finish_removal(&mut self) {
        self.removal_latched = true;
        self.state = MemberState::Removed;
    }
}
