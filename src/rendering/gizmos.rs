//! Immediate-mode drawing of the conveyor: hive outlines, members with their exit
//! fade, the progress bar, the crank and the brush.

use bevy::prelude::*;

use crate::core::config::GameConfig;
use crate::core::system::system_order::HiveSimSet;
use crate::hive::{Container, HiveSession, MemberState, Phase, SlotRole};
use crate::interaction::input::PointerState;

const MEMBER_RADIUS: f32 = 6.0;

pub struct HiveGizmoPlugin;

impl Plugin for HiveGizmoPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (draw_hives, draw_crank, draw_brush).after(HiveSimSet::Publish),
        );
    }
}

fn outline_color(role: SlotRole, phase: Phase) -> Color {
    match (role, phase) {
        (SlotRole::Active, Phase::Accumulating) => Color::srgb(0.95, 0.75, 0.2),
        (SlotRole::Active, Phase::Finishing) => Color::srgb(0.4, 0.9, 0.5),
        (SlotRole::Active, Phase::Complete) => Color::srgb(0.6, 0.6, 0.6),
        _ => Color::srgba(0.7, 0.6, 0.3, 0.5),
    }
}

fn draw_container(gizmos: &mut Gizmos, role: SlotRole, hive: &Container) {
    let bounds = hive.bounds();
    gizmos.rect_2d(
        Isometry2d::from_translation(bounds.center()),
        bounds.size(),
        outline_color(role, hive.phase()),
    );
    for member in hive.members() {
        let Some(pose) = hive.member_pose(member.id()) else {
            continue;
        };
        let color = match member.state() {
            MemberState::Active if member.hit_count() > 0 => Color::srgb(1.0, 0.55, 0.1),
            MemberState::Active => Color::srgb(1.0, 0.85, 0.1),
            _ => Color::srgba(1.0, 0.85, 0.1, pose.opacity),
        };
        gizmos.circle_2d(pose.position, MEMBER_RADIUS * pose.scale, color);
    }
    if role == SlotRole::Active {
        let left = Vec2::new(bounds.min.x, bounds.max.y + 12.0);
        let full = bounds.width();
        gizmos.line_2d(left, left + Vec2::X * full, Color::srgba(1.0, 1.0, 1.0, 0.25));
        gizmos.line_2d(
            left,
            left + Vec2::X * full * hive.progress_fraction(),
            Color::srgb(0.95, 0.75, 0.2),
        );
    }
}

fn draw_hives(session: Res<HiveSession>, mut gizmos: Gizmos) {
    for (role, hive) in session.conveyor().containers() {
        draw_container(&mut gizmos, role, hive);
    }
}

fn draw_crank(session: Res<HiveSession>, mut gizmos: Gizmos) {
    let Some(crank) = session.gesture().as_rotary() else {
        return;
    };
    let p = crank.params();
    let color = if crank.is_dragging() {
        Color::srgb(0.9, 0.9, 1.0)
    } else {
        Color::srgb(0.5, 0.5, 0.7)
    };
    gizmos.circle_2d(p.pivot, p.grab_radius, Color::srgba(0.5, 0.5, 0.7, 0.3));
    let tip = p.pivot + Vec2::from_angle(crank.handle_angle().to_radians()) * p.grab_radius * 0.8;
    gizmos.line_2d(p.pivot, tip, color);
    gizmos.circle_2d(tip, 8.0, color);
}

fn draw_brush(
    session: Res<HiveSession>,
    pointer: Res<PointerState>,
    cfg: Res<GameConfig>,
    mut gizmos: Gizmos,
) {
    let (Some(pos), true) = (pointer.0.position, pointer.0.pressed) else {
        return;
    };
    if session.conveyor().active().phase() == Phase::Finishing {
        gizmos.circle_2d(pos, cfg.brush.radius, Color::srgb(0.8, 0.6, 1.0));
    }
}
