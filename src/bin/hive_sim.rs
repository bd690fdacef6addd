//! Headless hive session runner.
//!
//! Drives a scripted pointer through full rounds: shake (or crank) the active hive
//! until it stops taking energy, then brush the remaining bees until the conveyor
//! advances. Prints a summary per hive; `--json` emits the same data as JSON.
//!
//! Example:
//!   cargo run --bin hive_sim -- --seed 7 --hives 3
//!   cargo run --bin hive_sim -- --config assets/config/game.ron --mode rotary --json

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bevy::math::Vec2;
use clap::{Parser, ValueEnum};
use serde::Serialize;

use hive_shaker::core::config::{GameConfig, GestureMode};
use hive_shaker::hive::{HiveEvent, HiveId, HiveSession, Phase, RemovalCause};
use hive_shaker::interaction::brush::BrushDetector;
use hive_shaker::interaction::gesture::PointerInput;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run scripted hive sessions without a window", long_about = None)]
struct Args {
    /// Config layers, later files override earlier keys. Defaults when omitted.
    #[arg(long = "config", value_name = "FILE")]
    configs: Vec<PathBuf>,
    /// RNG seed; falls back to `session.seed`, then to a random one (reported).
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many completed hives.
    #[arg(long, default_value_t = 3)]
    hives: u32,
    #[arg(long, default_value_t = 60.0)]
    fps: f32,
    /// Override `gesture.mode`.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Simulated time budget in seconds.
    #[arg(long, default_value_t = 120.0)]
    max_seconds: f32,
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Linear,
    Rotary,
}

impl From<ModeArg> for GestureMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Linear => GestureMode::Linear,
            ModeArg::Rotary => GestureMode::Rotary,
        }
    }
}

#[derive(Serialize, Default, Debug)]
struct HiveReport {
    hive: u32,
    completed_at: Option<f32>,
    shaken: u32,
    burst: u32,
    brushed: u32,
}

#[derive(Serialize, Debug)]
struct Report {
    seed: u64,
    mode: String,
    frames: u64,
    seconds: f32,
    hives_completed: u32,
    members_removed: u32,
    contacts: u32,
    crank_units: u32,
    timed_out: bool,
    hives: Vec<HiveReport>,
}

/// Scripted pointer: one sample per frame derived from the session state.
struct Driver {
    brush: BrushDetector,
    frame: u64,
    pressed_last: bool,
    crank_angle: f32,
}

impl Driver {
    fn new(brush_radius: f32) -> Self {
        Self {
            brush: BrushDetector::new(brush_radius),
            frame: 0,
            pressed_last: false,
            crank_angle: 0.0,
        }
    }

    fn pointer(&mut self, session: &HiveSession) -> PointerInput {
        self.frame += 1;
        let active = session.conveyor().active();
        let input = match active.phase() {
            Phase::Accumulating => self.gesture_input(session),
            Phase::Finishing => self.brush_input(session),
            Phase::Complete => PointerInput::released(),
        };
        self.pressed_last = input.pressed;
        input
    }

    fn gesture_input(&mut self, session: &HiveSession) -> PointerInput {
        // A drag only starts on a fresh press.
        if self.pressed_last && !session.gesture().is_dragging() {
            return PointerInput::released();
        }
        match session.gesture().as_rotary() {
            Some(crank) => {
                let p = crank.params();
                self.crank_angle += 8.0;
                let r = p.grab_radius * 0.5;
                PointerInput::pressed_at(p.pivot + Vec2::from_angle(self.crank_angle.to_radians()) * r)
            }
            None => {
                let center = session.conveyor().active().anchor().position;
                let dy = if self.frame % 2 == 0 { 30.0 } else { -30.0 };
                PointerInput::pressed_at(center + Vec2::new(0.0, dy))
            }
        }
    }

    fn brush_input(&mut self, session: &HiveSession) -> PointerInput {
        let active = session.conveyor().active();
        let target = active
            .members()
            .filter(|m| m.is_active())
            .find_map(|m| active.member_pose(m.id()));
        match target {
            Some(pose) if self.frame % 2 == 0 => PointerInput::pressed_at(pose.position),
            Some(pose) => PointerInput::pressed_at(
                pose.position + Vec2::new(0.0, self.brush.radius() * 4.0),
            ),
            None => PointerInput::released(),
        }
    }
}

fn load_config(args: &Args) -> Result<GameConfig> {
    if args.configs.is_empty() {
        return Ok(GameConfig::default());
    }
    for p in &args.configs {
        std::fs::metadata(p).with_context(|| format!("config layer {:?}", p))?;
    }
    let (cfg, _used, errors) = GameConfig::load_layered(&args.configs);
    if !errors.is_empty() {
        bail!("config errors:\n  {}", errors.join("\n  "));
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !(args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }
    let mut cfg = load_config(&args)?;
    for w in cfg.validate() {
        eprintln!("warning: {w}");
    }
    if let Some(m) = args.mode {
        cfg.gesture.mode = m.into();
    }
    let seed = args
        .seed
        .or(cfg.session.seed)
        .unwrap_or_else(rand::random::<u64>);
    cfg.session.seed = Some(seed);
    // The frame budget replaces the round timer.
    cfg.session.time_limit = 0.0;

    let mut session = HiveSession::new(&cfg);
    let mut driver = Driver::new(cfg.brush.radius);
    let dt = 1.0 / args.fps;
    let mut hives: BTreeMap<HiveId, HiveReport> = BTreeMap::new();
    let mut members_removed = 0;
    let mut contacts = 0;
    let mut crank_units = 0;
    let mut elapsed = 0.0_f32;

    while session.conveyor().completed() < args.hives && elapsed < args.max_seconds {
        let input = driver.pointer(&session);
        let entered = driver.brush.sweep(input, session.conveyor().active());
        for id in entered {
            session.contact(id);
            contacts += 1;
        }
        session.tick(dt, input);
        elapsed += dt;

        for ev in session.drain_events() {
            match ev {
                HiveEvent::MemberDeparting { hive, cause, .. } => {
                    let h = hives.entry(hive).or_insert_with(|| HiveReport {
                        hive: hive.0,
                        ..Default::default()
                    });
                    match cause {
                        RemovalCause::Shaken => h.shaken += 1,
                        RemovalCause::Burst => h.burst += 1,
                        RemovalCause::Brushed => h.brushed += 1,
                    }
                }
                HiveEvent::MemberRemoved { .. } => members_removed += 1,
                HiveEvent::HiveCompleted { hive, .. } => {
                    hives
                        .entry(hive)
                        .or_insert_with(|| HiveReport {
                            hive: hive.0,
                            ..Default::default()
                        })
                        .completed_at = Some(elapsed);
                }
                HiveEvent::CrankUnitCompleted { units } => crank_units = units,
                _ => {}
            }
        }
    }

    let completed = session.conveyor().completed();
    let report = Report {
        seed,
        mode: format!("{:?}", cfg.gesture.mode),
        frames: driver.frame,
        seconds: elapsed,
        hives_completed: completed,
        members_removed,
        contacts,
        crank_units,
        timed_out: completed < args.hives,
        hives: hives.into_values().collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report).context("serialize report")?);
    } else {
        println!(
            "seed {} mode {} | {} hives in {:.2}s ({} frames) | removed {} contacts {} units {}{}",
            report.seed,
            report.mode,
            report.hives_completed,
            report.seconds,
            report.frames,
            report.members_removed,
            report.contacts,
            report.crank_units,
            if report.timed_out { " | TIMED OUT" } else { "" }
        );
        for h in &report.hives {
            let done = h
                .completed_at
                .map(|t| format!("{t:.2}s"))
                .unwrap_or_else(|| "-".into());
            println!(
                "  hive#{:<3} done {:>8}  shaken {:>3}  burst {:>3}  brushed {:>3}",
                h.hive, done, h.shaken, h.burst, h.brushed
            );
        }
    }
    Ok(())
}
