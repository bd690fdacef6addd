#[cfg(feature = "debug")]
use crate::hive::{HiveEvent, HiveSession};
#[cfg(feature = "debug")]
use bevy::prelude::*;

#[cfg(feature = "debug")]
#[derive(Resource, Debug)]
pub struct DebugState {
    pub frame_counter: u64,
    pub log_interval: f32,
    pub time_accum: f32,
}

#[cfg(feature = "debug")]
impl Default for DebugState {
    fn default() -> Self {
        Self {
            frame_counter: 0,
            log_interval: 1.0,
            time_accum: 0.0,
        }
    }
}

#[cfg(feature = "debug")]
#[derive(Resource, Debug, Default)]
pub struct DebugStats {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub members_owned: usize,
    pub pending_removals: usize,
    pub removed_total: u64,
}

#[cfg(feature = "debug")]
pub fn debug_stats_collect_system(
    time: Res<Time>,
    mut state: ResMut<DebugState>,
    mut stats: ResMut<DebugStats>,
    session: Res<HiveSession>,
    mut events: EventReader<HiveEvent>,
) {
    state.frame_counter += 1;
    let dt = time.delta_secs().max(1e-6);
    let inst_fps = 1.0 / dt;
    if stats.fps == 0.0 {
        stats.fps = inst_fps;
    } else {
        stats.fps = stats.fps * 0.9 + inst_fps * 0.1;
    }
    let inst_ms = dt * 1000.0;
    if stats.frame_time_ms == 0.0 {
        stats.frame_time_ms = inst_ms;
    } else {
        stats.frame_time_ms = stats.frame_time_ms * 0.9 + inst_ms * 0.1;
    }
    let conveyor = session.conveyor();
    stats.members_owned = conveyor.containers().map(|(_, c)| c.member_count()).sum();
    stats.pending_removals = conveyor.containers().map(|(_, c)| c.pending_removals()).sum();
    stats.removed_total += events
        .read()
        .filter(|e| matches!(e, HiveEvent::MemberRemoved { .. }))
        .count() as u64;
}
