use bevy::prelude::*;

use crate::app::game::GameplayBlocked;
use crate::core::system::system_order::HiveSimSet;
use crate::hive::HiveSession;

/// Keyboard shortcuts for the windowed build: `R` restarts the round, `P` toggles
/// the gameplay-blocked flag.
pub struct SessionKeysPlugin;

impl Plugin for SessionKeysPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, session_keys.in_set(HiveSimSet::Input));
    }
}

fn session_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<HiveSession>,
    mut blocked: ResMut<GameplayBlocked>,
) {
    if keys.just_pressed(KeyCode::KeyR) {
        session.reset();
    }
    if keys.just_pressed(KeyCode::KeyP) {
        blocked.0 = !blocked.0;
    }
}
