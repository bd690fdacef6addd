#[cfg(feature = "debug")]
use bevy::prelude::*;
#[cfg(feature = "debug")]
use super::stats::{DebugState, DebugStats};
#[cfg(feature = "debug")]
use crate::hive::HiveProgress;

#[cfg(feature = "debug")]
pub fn debug_logging_system(
    time: Res<Time>,
    mut state: ResMut<DebugState>,
    stats: Res<DebugStats>,
    progress: Res<HiveProgress>,
) {
    state.time_accum += time.delta_secs();
    if state.time_accum >= state.log_interval {
        state.time_accum = 0.0;
        info!("SIM frame={} t={:.3}s fps={:.1} ft_ms={:.1} hive={} phase={:?} progress={:.2} live={} owned={} leaving={} removed={} done={} mode={:?}",
            state.frame_counter,
            time.elapsed_secs(),
            stats.fps,
            stats.frame_time_ms,
            progress.hive,
            progress.phase,
            progress.fraction,
            progress.live_members,
            stats.members_owned,
            stats.pending_removals,
            stats.removed_total,
            progress.completed,
            progress.mode);
    }
}
