//! Hive depletion core: placement, members, containers, removal animations and the
//! three-slot conveyor. Everything here is plain state advanced by `tick(dt)`; the
//! Bevy side only owns a [`session::HiveSession`] and drives it once per frame.

pub mod container;
pub mod conveyor;
pub mod events;
pub mod member;
pub mod params;
pub mod placement;
pub mod removal;
pub mod session;

use std::fmt;

/// Identifier of a container (hive). Allocated by the conveyor, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HiveId(pub u32);

/// Identifier of a member (bee). Unique across every container of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(pub u32);

impl fmt::Display for HiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hive#{}", self.0)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bee#{}", self.0)
    }
}

/// Monotonic id source shared by every container of a session.
#[derive(Debug, Default, Clone)]
pub struct IdSeq(u32);

impl IdSeq {
    pub fn next_id(&mut self) -> u32 {
        let id = self.0;
        self.0 = self.0.wrapping_add(1);
        id
    }
}

pub use container::{Container, MemberPose, Phase};
pub use conveyor::{ConveyorManager, SlotRole, SlotTransform};
pub use events::{HiveEvent, RemovalCause};
pub use member::{HitOutcome, Member, MemberState};
pub use params::{GestureParams, HiveParams};
pub use placement::PlacementGenerator;
pub use removal::{RemovalAnimation, RemovalAnimator, RemovalPose};
pub use session::{HiveProgress, HiveSession};
