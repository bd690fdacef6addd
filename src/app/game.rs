// This file is part of Hive Shaker.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;

use crate::core::config::GameConfig;
use crate::core::system::system_order::HiveSimSet;
use crate::debug::DebugPlugin;
use crate::hive::{HiveEvent, HiveProgress, HiveSession};
use crate::interaction::input::PointerState;

/// External "gameplay blocked" switch (pause menus, tutorials). While set, gestures
/// and contacts are ignored.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameplayBlocked(pub bool);

/// Core driver. Owns the [`HiveSession`] resource and advances it once per frame.
/// Pointer sampling, brushing and drawing come from their own plugins so headless
/// apps can write [`PointerState`] directly.
pub struct HivePlugin;

impl Plugin for HivePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<GameConfig>() {
            app.init_resource::<GameConfig>();
        }
        let session = HiveSession::new(app.world().resource::<GameConfig>());
        let progress = session.progress();
        app.insert_resource(session)
            .insert_resource(progress)
            .init_resource::<GameplayBlocked>()
            .init_resource::<PointerState>()
            .add_event::<HiveEvent>()
            .configure_sets(
                Update,
                (
                    HiveSimSet::Input,
                    HiveSimSet::Contacts,
                    HiveSimSet::Step,
                    HiveSimSet::Publish,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    sync_blocked.in_set(HiveSimSet::Input),
                    drive_hive_session.in_set(HiveSimSet::Step),
                    (publish_progress, forward_hive_events).in_set(HiveSimSet::Publish),
                ),
            )
            .add_plugins(DebugPlugin);
    }
}

fn sync_blocked(blocked: Res<GameplayBlocked>, mut session: ResMut<HiveSession>) {
    if blocked.is_changed() {
        session.set_blocked(blocked.0);
    }
}

pub fn drive_hive_session(
    time: Res<Time>,
    pointer: Res<PointerState>,
    mut session: ResMut<HiveSession>,
) {
    session.tick(time.delta_secs(), pointer.0);
}

fn publish_progress(session: Res<HiveSession>, mut progress: ResMut<HiveProgress>) {
    progress.set_if_neq(session.progress());
}

fn forward_hive_events(mut session: ResMut<HiveSession>, mut out: EventWriter<HiveEvent>) {
    for ev in session.drain_events() {
        match &ev {
            HiveEvent::HiveCompleted { hive, total } => info!("{hive} solved ({total} total)"),
            HiveEvent::SessionEnded { completed } => info!("session ended with {completed} hives"),
            _ => {}
        }
        out.write(ev);
    }
}
