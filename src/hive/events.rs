use bevy::prelude::*;

use super::{container::Phase, HiveId, MemberId};

/// Why a member started leaving its hive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// Depletion step while shaking / cranking.
    Shaken,
    /// Surplus burst when progress reached the threshold.
    Burst,
    /// Enough contacts in the finishing phase.
    Brushed,
}

/// Everything the hive core reports to collaborators (UI, audio, score hooks).
#[derive(Event, Debug, Clone, PartialEq)]
pub enum HiveEvent {
    MemberDeparting {
        hive: HiveId,
        member: MemberId,
        cause: RemovalCause,
    },
    /// Exit animation finished (or was cut short); the member no longer exists.
    MemberRemoved { hive: HiveId, member: MemberId },
    PhaseChanged { hive: HiveId, from: Phase, to: Phase },
    /// The active hive was solved. `total` counts completions this session.
    HiveCompleted { hive: HiveId, total: u32 },
    /// Retiring hive finished its exit and was destroyed.
    HiveRetired { hive: HiveId },
    CrankUnitCompleted { units: u32 },
    SessionEnded { completed: u32 },
}
