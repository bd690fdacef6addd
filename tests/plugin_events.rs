use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use hive_shaker::core::system::system_order::HiveSimSet;
use hive_shaker::hive::{HiveEvent, Phase, RemovalCause};
use hive_shaker::interaction::brush::BrushPlugin;
use hive_shaker::interaction::gesture::PointerInput;
use hive_shaker::interaction::input::PointerState;
use hive_shaker::{GameConfig, GameplayBlocked, HivePlugin, HiveProgress, HiveSession};

/// Everything a downstream reader of `HiveEvent` would see.
#[derive(Resource, Default)]
struct Collected(Vec<HiveEvent>);

fn collect(mut reader: EventReader<HiveEvent>, mut out: ResMut<Collected>) {
    out.0.extend(reader.read().cloned());
}

fn test_app(seed: u64) -> App {
    let mut cfg = GameConfig::default();
    cfg.session.seed = Some(seed);
    cfg.session.time_limit = 0.0;
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
    app.insert_resource(cfg);
    // Pointer is written by the test instead of PointerInputPlugin.
    app.add_plugins((HivePlugin, BrushPlugin));
    app.init_resource::<Collected>()
        .add_systems(Update, collect.after(HiveSimSet::Publish));
    app
}

fn set_pointer(app: &mut App, input: PointerInput) {
    app.world_mut().resource_mut::<PointerState>().0 = input;
}

fn drain(app: &mut App) -> Vec<HiveEvent> {
    std::mem::take(&mut app.world_mut().resource_mut::<Collected>().0)
}

fn active_center(app: &App) -> Vec2 {
    app.world()
        .resource::<HiveSession>()
        .conveyor()
        .active()
        .anchor()
        .position
}

fn shake(app: &mut App, frames: usize) {
    let center = active_center(app);
    set_pointer(app, PointerInput::released());
    app.update();
    set_pointer(app, PointerInput::pressed_at(center));
    app.update();
    for i in 0..frames {
        let dy = if i % 2 == 0 { 30.0 } else { -30.0 };
        set_pointer(app, PointerInput::pressed_at(center + Vec2::new(0.0, dy)));
        app.update();
    }
    set_pointer(app, PointerInput::released());
    app.update();
}

#[test]
fn pointer_shaking_publishes_progress() {
    let mut app = test_app(1);
    app.update();
    shake(&mut app, 60);
    let progress = app.world().resource::<HiveProgress>();
    assert!(progress.fraction > 0.0, "{progress:?}");
    assert_eq!(progress.phase, Phase::Accumulating);
    assert!(progress.live_members < 50);
    let events = drain(&mut app);
    assert!(events.iter().any(|e| matches!(
        e,
        HiveEvent::MemberDeparting {
            cause: RemovalCause::Shaken,
            ..
        }
    )));
}

#[test]
fn blocked_resource_suppresses_gestures() {
    let mut app = test_app(2);
    app.insert_resource(GameplayBlocked(true));
    app.update();
    shake(&mut app, 60);
    let progress = app.world().resource::<HiveProgress>();
    assert!(progress.blocked);
    assert_eq!(progress.fraction, 0.0);
}

#[test]
fn brushing_completes_hive_and_forwards_events() {
    let mut app = test_app(3);
    app.update();
    shake(&mut app, 500);
    assert_eq!(app.world().resource::<HiveProgress>().phase, Phase::Finishing);
    // let burst removals settle
    for _ in 0..120 {
        app.update();
    }
    let mut events = drain(&mut app);

    for _ in 0..200 {
        let target = {
            let session = app.world().resource::<HiveSession>();
            let active = session.conveyor().active();
            if active.phase() != Phase::Finishing {
                break;
            }
            active
                .members()
                .filter(|m| m.is_active())
                .find_map(|m| active.member_pose(m.id()))
                .map(|p| p.position)
        };
        let Some(pos) = target else { break };
        set_pointer(&mut app, PointerInput::pressed_at(pos));
        app.update();
        set_pointer(&mut app, PointerInput::pressed_at(pos + Vec2::new(0.0, 100.0)));
        app.update();
    }
    set_pointer(&mut app, PointerInput::released());
    for _ in 0..5 {
        app.update();
    }
    events.extend(drain(&mut app));

    assert!(events.iter().any(|e| matches!(
        e,
        HiveEvent::MemberDeparting {
            cause: RemovalCause::Brushed,
            ..
        }
    )));
    let completed: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, HiveEvent::HiveCompleted { .. }))
        .collect();
    assert_eq!(completed.len(), 1);
    assert_eq!(app.world().resource::<HiveProgress>().completed, 1);
}
