#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Skirmish battle.

mod scenario;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use skirmish_core::{Command, Event, Side};
use skirmish_system_combat::CombatDriver;
use skirmish_world::{self as world, query, World};
use tracing::{debug, info};

use crate::scenario::Scenario;

/// Runs an automated battle until one side is eliminated.
#[derive(Debug, Parser)]
#[command(name = "skirmish", about = "Headless auto-battler simulation")]
struct Args {
    /// Simulated milliseconds that pass per tick.
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,

    /// Upper bound on simulated ticks before the battle is called a draw.
    #[arg(long, default_value_t = 400)]
    max_ticks: u64,

    /// JSON scenario file describing the board and roster.
    #[arg(long)]
    scenario: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default_skirmish(),
    };

    let mut world = World::new();
    let mut events = Vec::new();
    for command in scenario.seed_commands() {
        world::apply(&mut world, command, &mut events);
    }
    log_events(&events);

    let mut driver = CombatDriver::new();
    let dt = Duration::from_millis(args.tick_ms);

    for _ in 0..args.max_ticks {
        events.clear();
        world::apply(&mut world, Command::Tick { dt }, &mut events);

        let units = query::unit_view(&world);
        let mut commands = Vec::new();
        driver.handle(&events, &units, query::board_view(&world), &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        log_events(&events);

        if query::side_count(&world, Side::Player) == 0
            || query::side_count(&world, Side::Enemy) == 0
        {
            break;
        }
    }

    report_outcome(&world);
    Ok(())
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::BoardConfigured { columns, rows } => {
                info!(columns, rows, "board configured");
            }
            Event::UnitSpawned { unit, side, cell } => {
                info!(
                    unit = unit.get(),
                    side = ?side,
                    column = cell.column(),
                    row = cell.row(),
                    "unit spawned"
                );
            }
            Event::UnitMoved { unit, to, facing, .. } => {
                debug!(
                    unit = unit.get(),
                    column = to.column(),
                    row = to.row(),
                    facing = ?facing,
                    "unit moved"
                );
            }
            Event::UnitStruck {
                attacker, target, ..
            } => {
                debug!(
                    attacker = attacker.get(),
                    target = target.get(),
                    "unit struck"
                );
            }
            Event::UnitDamaged {
                unit,
                amount,
                remaining,
            } => {
                debug!(
                    unit = unit.get(),
                    amount,
                    remaining = remaining.get(),
                    "unit damaged"
                );
            }
            Event::EnergyGained { unit, energy } => {
                debug!(unit = unit.get(), energy = energy.get(), "energy gained");
            }
            Event::UnitDefeated { unit } => {
                info!(unit = unit.get(), "unit defeated");
            }
            Event::StepRejected { unit, reason, .. } => {
                debug!(unit = unit.get(), %reason, "step rejected");
            }
            Event::StrikeRejected { attacker, reason } => {
                debug!(attacker = attacker.get(), %reason, "strike rejected");
            }
            Event::TimeAdvanced { .. } => {}
        }
    }
}

fn report_outcome(world: &World) {
    let players = query::side_count(world, Side::Player);
    let enemies = query::side_count(world, Side::Enemy);
    let ticks = query::ticks(world);

    let outcome = match (players, enemies) {
        (0, 0) => "mutual destruction".to_owned(),
        (_, 0) => format!("player victory with {players} unit(s) standing"),
        (0, _) => format!("enemy victory with {enemies} unit(s) standing"),
        _ => format!("draw after the tick budget ({players} vs {enemies} still standing)"),
    };

    info!(ticks, "battle over");
    println!("{outcome} after {ticks} ticks");
}
