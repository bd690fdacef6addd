use bevy::prelude::*;

use crate::core::system::system_order::HiveSimSet;
use crate::interaction::gesture::PointerInput;

/// Latest pointer sample in world coordinates. Written by [`PointerInputPlugin`] in
/// `HiveSimSet::Input`; tests and scripted drivers may write it directly.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct PointerState(pub PointerInput);

pub struct PointerInputPlugin;

impl Plugin for PointerInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>()
            .add_systems(Update, sample_pointer.in_set(HiveSimSet::Input));
    }
}

fn cursor_world_pos(
    camera_q: &Query<(&Camera, &GlobalTransform)>,
    screen_pos: Vec2,
) -> Option<Vec2> {
    let (camera, cam_tf) = camera_q.iter().next()?;
    camera.viewport_to_world_2d(cam_tf, screen_pos).ok()
}

fn primary_pointer_world_pos(
    window: &Window,
    touches: &Touches,
    camera_q: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    if let Some(touch) = touches.iter().next() {
        return cursor_world_pos(camera_q, touch.position());
    }
    let cursor = window.cursor_position()?;
    cursor_world_pos(camera_q, cursor)
}

fn sample_pointer(
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows_q: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    mut pointer: ResMut<PointerState>,
) {
    let Ok(window) = windows_q.single() else {
        pointer.0 = PointerInput::released();
        return;
    };
    let pressed = buttons.pressed(MouseButton::Left) || touches.iter().next().is_some();
    pointer.0 = PointerInput {
        position: primary_pointer_world_pos(window, &touches, &camera_q),
        pressed,
    };
}
