use bevy::prelude::*;

use hive_shaker::interaction::brush::BrushPlugin;
use hive_shaker::interaction::input::PointerInputPlugin;
use hive_shaker::interaction::session::config_hot_reload::ConfigHotReloadPlugin;
use hive_shaker::interaction::session::session_keys::SessionKeysPlugin;
use hive_shaker::rendering::camera::CameraPlugin;
use hive_shaker::rendering::gizmos::HiveGizmoPlugin;
use hive_shaker::rendering::hud::HudPlugin;
use hive_shaker::{GameConfig, HivePlugin};

fn main() {
    // Layered config: base file plus optional local overrides; defaults when both are missing.
    let (cfg, used, errors) = GameConfig::load_layered([
        "assets/config/game.ron",
        "assets/config/game.local.ron",
    ]);
    let warnings = cfg.validate();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: cfg.window.title.clone(),
                resolution: (cfg.window.width, cfg.window.height).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.12, 0.1, 0.08)))
        .insert_resource(cfg)
        .add_systems(Startup, move || {
            info!("config layers: {:?}", used);
            for e in &errors {
                // the local overlay is optional
                if !e.contains("game.local.ron") {
                    warn!("config: {e}");
                }
            }
            for w in &warnings {
                warn!("config: {w}");
            }
        })
        .add_plugins((
            CameraPlugin,
            HivePlugin,
            PointerInputPlugin,
            BrushPlugin,
            SessionKeysPlugin,
            HiveGizmoPlugin,
            HudPlugin,
            ConfigHotReloadPlugin,
        ))
        .run();
}
