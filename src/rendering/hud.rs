use bevy::prelude::*;

use crate::core::system::system_order::HiveSimSet;
use crate::hive::{HiveProgress, Phase};

#[derive(Component)]
pub(crate) struct HudText;

/// Top-left status line: phase, progress, completed count and the round timer.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, hud_spawn)
            .add_systems(Update, hud_update.after(HiveSimSet::Publish));
    }
}

fn hud_spawn(mut commands: Commands) {
    commands.spawn((
        Text::new(String::new()),
        TextFont {
            font_size: 18.0,
            ..Default::default()
        },
        TextColor(Color::WHITE),
        bevy::ui::Node {
            position_type: bevy::ui::PositionType::Absolute,
            top: Val::Px(6.0),
            left: Val::Px(8.0),
            ..Default::default()
        },
        HudText,
    ));
}

pub(crate) fn hud_line(p: &HiveProgress) -> String {
    let phase = match p.phase {
        Phase::Accumulating => "shake!",
        Phase::Finishing => "brush!",
        Phase::Complete => "done",
    };
    let mut line = format!(
        "{} {:>3.0}%  bees {}  hives {}",
        phase,
        p.fraction * 100.0,
        p.live_members,
        p.completed
    );
    if let Some(m) = p.momentum {
        line.push_str(&format!("  x{:.1}  units {}", m, p.crank_units));
    }
    if let Some(t) = p.time_remaining {
        line.push_str(&format!("  {:.0}s", t.ceil()));
    }
    if p.ended {
        line.push_str("  TIME UP (R to restart)");
    } else if p.blocked {
        line.push_str("  paused");
    }
    line
}

fn hud_update(progress: Res<HiveProgress>, mut q_text: Query<&mut Text, With<HudText>>) {
    if !progress.is_changed() {
        return;
    }
    if let Ok(mut text) = q_text.single_mut() {
        text.0 = hud_line(&progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_mentions_timer_and_end() {
        let p = HiveProgress {
            fraction: 0.5,
            time_remaining: Some(12.2),
            ended: true,
            ..Default::default()
        };
        let line = hud_line(&p);
        assert!(line.starts_with("shake!  50%"));
        assert!(line.contains("13s"));
        assert!(line.contains("TIME UP"));
    }
}
