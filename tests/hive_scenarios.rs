//! End-to-end scenarios against the public hive API (no Bevy app).

use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hive_shaker::core::config::GameConfig;
use hive_shaker::hive::conveyor::SlotLayout;
use hive_shaker::hive::{
    Container, ConveyorManager, HitOutcome, HiveEvent, HiveId, HiveParams, HiveSession, IdSeq,
    MemberState, Phase, PlacementGenerator, SlotTransform,
};
use hive_shaker::interaction::gesture::PointerInput;

const DT: f32 = 1.0 / 60.0;

fn fifty_member_hive(floor: u32, hits: u32, rng: &mut StdRng) -> Container {
    let params = HiveParams {
        members: 50,
        threshold: 100.0,
        step_fraction: 0.02,
        final_floor: floor..=floor,
        hits_required: hits..=hits,
        ..HiveParams::default()
    };
    let mut ids = IdSeq::default();
    let mut hive = Container::new(HiveId(0), &params, floor, SlotTransform::IDENTITY);
    hive.populate(&mut ids, rng);
    hive
}

#[test]
fn scatter_count_is_exact_even_when_infeasible() {
    let mut rng = StdRng::seed_from_u64(1);
    let tight = PlacementGenerator::new(Vec2::new(20.0, 20.0), 15.0, 10);
    assert!(!tight.is_feasible(40, 1.0));
    assert_eq!(tight.scatter(40, 1.0, &mut rng).len(), 40);

    let roomy = PlacementGenerator::new(Vec2::new(240.0, 120.0), 9.0, 100);
    for n in [0, 1, 7, 50] {
        assert_eq!(roomy.scatter(n, 1.5, &mut rng).len(), n);
    }
}

#[test]
fn fifty_calls_of_two_leave_the_floor_and_finish() {
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut hive = fifty_member_hive(6, 1, &mut rng);
        for _ in 0..50 {
            hive.add_energy(2.0, &mut rng);
            hive.tick(DT);
        }
        assert_eq!(hive.progress_fraction(), 1.0);
        assert_eq!(hive.phase(), Phase::Finishing);
        assert!((5..=8).contains(&hive.live_count()), "seed {seed}");
    }
}

#[test]
fn random_energy_sequences_end_within_floor_range() {
    let mut rng = StdRng::seed_from_u64(77);
    let cfg = GameConfig::default();
    let params = HiveParams::from_config(&cfg);
    let mut ids = IdSeq::default();
    for round in 0..25 {
        let floor = rng.gen_range(params.final_floor.clone());
        let mut hive = Container::new(HiveId(round), &params, floor, SlotTransform::IDENTITY);
        hive.populate(&mut ids, &mut rng);
        let mut live = hive.live_count();
        while hive.phase() == Phase::Accumulating {
            hive.add_energy(rng.gen_range(0.5..25.0), &mut rng);
            assert!(hive.live_count() <= live);
            live = hive.live_count();
        }
        assert_eq!(hive.phase(), Phase::Finishing);
        let n = hive.live_count() as u32;
        assert!(params.final_floor.contains(&n), "round {round}: {n}");
    }
}

#[test]
fn member_needing_three_hits_takes_exactly_three() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut hive = fifty_member_hive(6, 3, &mut rng);
    let early = hive.members().next().map(|m| m.id()).unwrap();
    assert_eq!(hive.contact(early, &mut rng), HitOutcome::Ignored);
    assert_eq!(hive.member(early).unwrap().hit_count(), 0);

    hive.add_energy(100.0, &mut rng);
    let id = hive.members().find(|m| m.is_active()).map(|m| m.id()).unwrap();
    let outcomes: Vec<_> = (0..4).map(|_| hive.contact(id, &mut rng)).collect();
    assert!(matches!(outcomes[0], HitOutcome::Counted { hits: 1, .. }));
    assert!(matches!(outcomes[1], HitOutcome::Counted { hits: 2, .. }));
    assert_eq!(outcomes[2], HitOutcome::Triggered);
    assert_eq!(outcomes[3], HitOutcome::Ignored);
    let m = hive.member(id).unwrap();
    assert_eq!(m.state(), MemberState::Removing);
    assert_eq!(m.hit_count(), 3);
}

#[test]
fn conveyor_promotes_queued_after_completion() {
    let mut rng = StdRng::seed_from_u64(4);
    let params = HiveParams {
        hits_required: 1..=1,
        ..HiveParams::default()
    };
    let layout = SlotLayout::default();
    let mut conveyor = ConveyorManager::new(params.clone(), layout.clone(), &mut rng);
    let queued_before = conveyor.queued().id();

    conveyor.feed_energy(100.0, &mut rng);
    conveyor.tick(1.0, &mut rng);
    let ids: Vec<_> = conveyor.active().members().map(|m| m.id()).collect();
    for id in ids {
        assert_eq!(conveyor.contact(id, &mut rng), HitOutcome::Triggered);
    }
    assert_eq!(conveyor.active().phase(), Phase::Complete);

    let mut completions = 0;
    for _ in 0..60 {
        conveyor.tick(DT, &mut rng);
        completions += conveyor
            .drain_events()
            .iter()
            .filter(|e| matches!(e, HiveEvent::HiveCompleted { .. }))
            .count();
    }
    assert_eq!(completions, 1);
    assert_eq!(conveyor.active().id(), queued_before);
    assert_eq!(conveyor.active().anchor(), layout.active);
    assert_eq!(conveyor.queued().member_count(), params.members);
    assert!(conveyor.retiring().is_none());
}

fn run_round(seed: u64) -> Vec<HiveEvent> {
    let mut cfg = GameConfig::default();
    cfg.session.seed = Some(seed);
    cfg.session.time_limit = 0.0;
    let mut session = HiveSession::new(&cfg);
    let center = session.conveyor().active().anchor().position;
    let mut events = Vec::new();
    session.tick(DT, PointerInput::pressed_at(center));
    for i in 0..400 {
        let dy = if i % 2 == 0 { 25.0 } else { -25.0 };
        session.tick(DT, PointerInput::pressed_at(center + Vec2::new(0.0, dy)));
        events.extend(session.drain_events());
    }
    let ids: Vec<_> = session
        .conveyor()
        .active()
        .members()
        .filter(|m| m.is_active())
        .map(|m| m.id())
        .collect();
    for _ in 0..3 {
        for id in &ids {
            session.contact(*id);
        }
    }
    for _ in 0..120 {
        session.tick(DT, PointerInput::released());
        events.extend(session.drain_events());
    }
    events
}

#[test]
fn seeded_sessions_replay_identically() {
    let a = run_round(21);
    let b = run_round(21);
    assert_eq!(a, b);
    assert!(a.contains(&HiveEvent::HiveCompleted {
        hive: HiveId(0),
        total: 1
    }));
    assert!(a.contains(&HiveEvent::HiveRetired { hive: HiveId(0) }));
}
