use bevy::prelude::*;
use std::collections::HashSet;

use crate::core::config::GameConfig;
use crate::core::system::system_order::HiveSimSet;
use crate::hive::{Container, HiveSession, MemberId, Phase};
use crate::interaction::gesture::PointerInput;
use crate::interaction::input::PointerState;

/// Turns a pressed pointer sweeping over the active hive into member contacts.
/// A member is hit once per entry into the brush radius, not once per frame.
#[derive(Debug, Clone, Default)]
pub struct BrushDetector {
    radius: f32,
    inside: HashSet<MemberId>,
}

impl BrushDetector {
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
            inside: HashSet::new(),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }

    /// Members that entered the brush this tick.
    pub fn sweep(&mut self, pointer: PointerInput, hive: &Container) -> Vec<MemberId> {
        let pos = match pointer.position {
            Some(p) if pointer.pressed && hive.phase() == Phase::Finishing => p,
            _ => {
                self.inside.clear();
                return Vec::new();
            }
        };
        let r2 = self.radius * self.radius;
        let now: HashSet<MemberId> = hive
            .members()
            .filter(|m| m.is_active())
            .filter_map(|m| {
                let pose = hive.member_pose(m.id())?;
                (pose.position.distance_squared(pos) <= r2).then_some(m.id())
            })
            .collect();
        let mut entered: Vec<MemberId> = now.difference(&self.inside).copied().collect();
        entered.sort();
        self.inside = now;
        entered
    }
}

#[derive(Resource, Debug, Default)]
pub struct BrushState(pub BrushDetector);

pub struct BrushPlugin;

impl Plugin for BrushPlugin {
    fn build(&self, app: &mut App) {
        let radius = app
            .world()
            .get_resource::<GameConfig>()
            .map(|c| c.brush.radius)
            .unwrap_or_else(|| GameConfig::default().brush.radius);
        app.insert_resource(BrushState(BrushDetector::new(radius)))
            .add_systems(Update, brush_contacts.in_set(HiveSimSet::Contacts));
    }
}

fn brush_contacts(
    pointer: Res<PointerState>,
    cfg: Res<GameConfig>,
    mut brush: ResMut<BrushState>,
    mut session: ResMut<HiveSession>,
) {
    if cfg.is_changed() {
        brush.0.set_radius(cfg.brush.radius);
    }
    let entered = brush.0.sweep(pointer.0, session.conveyor().active());
    for id in entered {
        let outcome = session.contact(id);
        debug!("brush hit {} -> {:?}", id, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hive::{HiveId, HiveParams, IdSeq, SlotTransform};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn finishing_hive(rng: &mut StdRng) -> Container {
        let p = HiveParams {
            members: 0,
            final_floor: 2..=2,
            hits_required: 2..=2,
            ..HiveParams::default()
        };
        let mut ids = IdSeq::default();
        let mut c = Container::new(HiveId(0), &p, 2, SlotTransform::IDENTITY);
        c.populate_at(&[Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)], &mut ids, rng);
        c.add_energy(p.threshold, rng);
        assert_eq!(c.phase(), Phase::Finishing);
        c
    }

    #[test]
    fn hits_once_per_entry() {
        let mut rng = StdRng::seed_from_u64(1);
        let hive = finishing_hive(&mut rng);
        let mut brush = BrushDetector::new(18.0);

        let over = PointerInput::pressed_at(Vec2::new(5.0, 0.0));
        assert_eq!(brush.sweep(over, &hive), vec![MemberId(0)]);
        assert!(brush.sweep(over, &hive).is_empty());

        let away = PointerInput::pressed_at(Vec2::new(50.0, 0.0));
        assert!(brush.sweep(away, &hive).is_empty());
        assert_eq!(brush.sweep(over, &hive), vec![MemberId(0)]);
    }

    #[test]
    fn idle_without_press_or_outside_finishing() {
        let mut rng = StdRng::seed_from_u64(2);
        let hive = finishing_hive(&mut rng);
        let mut brush = BrushDetector::new(18.0);
        let hover = PointerInput::hover(Vec2::new(100.0, 0.0));
        assert!(brush.sweep(hover, &hive).is_empty());

        let p = HiveParams::default();
        let mut ids = IdSeq::default();
        let mut fresh = Container::new(HiveId(1), &p, 5, SlotTransform::IDENTITY);
        fresh.populate_at(&[Vec2::ZERO], &mut ids, &mut rng);
        assert!(brush
            .sweep(PointerInput::pressed_at(Vec2::ZERO), &fresh)
            .is_empty());
    }
}
