use bevy::prelude::*;
use std::{collections::HashMap, path::PathBuf, time::SystemTime};

use crate::core::config::GameConfig;
use crate::hive::HiveSession;

#[derive(Resource, Debug, Clone)]
pub struct ConfigReloadSettings { pub paths: Vec<PathBuf>, pub interval_secs: f32 }
impl Default for ConfigReloadSettings { fn default() -> Self { Self { paths: vec![ PathBuf::from("assets/config/game.ron"), PathBuf::from("assets/config/game.local.ron"), ], interval_secs: 0.5 } } }
#[derive(Resource, Debug)]
struct ConfigReloadState { last_mod: HashMap<PathBuf, SystemTime>, timer: Timer }
impl FromWorld for ConfigReloadState { fn from_world(_world: &mut World) -> Self { Self { last_mod: HashMap::new(), timer: Timer::from_seconds(0.5, TimerMode::Repeating) } } }

/// Polls the layered config files and retunes the running session when they change.
/// New hive tuning applies to hives spawned afterwards; gesture tuning applies at once.
pub struct ConfigHotReloadPlugin;
impl Plugin for ConfigHotReloadPlugin { fn build(&self, app: &mut App) { app.init_resource::<ConfigReloadSettings>().init_resource::<ConfigReloadState>().add_systems(Update, poll_and_reload_config); } }

fn poll_and_reload_config(
    time: Res<Time>,
    settings: Res<ConfigReloadSettings>,
    mut state: ResMut<ConfigReloadState>,
    mut cfg_res: ResMut<GameConfig>,
    mut session: Option<ResMut<HiveSession>>,
    mut windows: Query<&mut Window>,
) {
    if (state.timer.duration().as_secs_f32() - settings.interval_secs).abs() > f32::EPSILON { state.timer.set_duration(std::time::Duration::from_secs_f32(settings.interval_secs.max(0.05))); }
    if !state.timer.tick(time.delta()).finished() { return; }
    if !mark_modified(&settings.paths, &mut state.last_mod) { return; }

    let (new_cfg, used, errors) = GameConfig::load_layered(settings.paths.iter());
    for e in errors { warn!("config hot-reload issue: {e}"); }
    if *cfg_res == new_cfg { return; }
    for w in new_cfg.validate() { warn!("config: {w}"); }
    info!("config hot-reload applied from {:?}", used);
    if let Some(s) = session.as_deref_mut() { s.apply_config(&new_cfg); }
    if let Ok(mut window) = windows.single_mut() {
        if window.width() != new_cfg.window.width || window.height() != new_cfg.window.height { window.resolution.set(new_cfg.window.width, new_cfg.window.height); }
        if window.title != new_cfg.window.title { window.title = new_cfg.window.title.clone(); }
    }
    *cfg_res = new_cfg;
}

/// Records newer modification times; true when any file changed since the last poll.
fn mark_modified(paths: &[PathBuf], last_mod: &mut HashMap<PathBuf, SystemTime>) -> bool {
    use std::time::UNIX_EPOCH;
    let mut dirty = false;
    for path in paths {
        let Ok(mod_time) = std::fs::metadata(path).and_then(|m| m.modified()) else { continue };
        let entry = last_mod.entry(path.clone()).or_insert(UNIX_EPOCH);
        if mod_time > *entry { *entry = mod_time; dirty = true; }
    }
    dirty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_new_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("game.ron");
        std::fs::write(&present, "(hive: (members: 10))").unwrap();
        let paths = vec![present.clone(), dir.path().join("game.local.ron")];
        let mut seen = HashMap::new();
        assert!(mark_modified(&paths, &mut seen));
        assert!(!mark_modified(&paths, &mut seen));
        assert_eq!(seen.len(), 1);
    }
}
