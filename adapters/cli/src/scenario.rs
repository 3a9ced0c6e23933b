//! Scenario files describing a board and its starting roster.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use skirmish_core::{CellCoord, Command, Energy, Health, Side, Speed, UnitStats};

/// Declarative description of a battle: board dimensions plus unit placements.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Scenario {
    /// Number of cell columns laid out on the board.
    pub(crate) columns: u32,
    /// Number of cell rows laid out on the board.
    pub(crate) rows: u32,
    /// Units placed before the first tick.
    pub(crate) units: Vec<UnitPlacement>,
}

/// A single unit entry within a scenario file.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub(crate) struct UnitPlacement {
    pub(crate) column: u32,
    pub(crate) row: u32,
    pub(crate) side: Side,
    pub(crate) stats: UnitStats,
}

impl Scenario {
    /// Loads a scenario from a JSON file on disk.
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scenario file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing scenario file {}", path.display()))
    }

    /// Built-in skirmish used when no scenario file is provided: two ranks
    /// of three units facing each other across an eight-by-six board.
    pub(crate) fn default_skirmish() -> Self {
        let player = |column, row, speed, attack| UnitPlacement {
            column,
            row,
            side: Side::Player,
            stats: stats(speed, attack),
        };
        let enemy = |column, row, speed, attack| UnitPlacement {
            column,
            row,
            side: Side::Enemy,
            stats: stats(speed, attack),
        };

        Self {
            columns: 8,
            rows: 6,
            units: vec![
                player(0, 1, 120, 5),
                player(0, 3, 100, 4),
                player(1, 2, 90, 6),
                enemy(7, 1, 110, 4),
                enemy(7, 4, 100, 5),
                enemy(6, 2, 80, 6),
            ],
        }
    }

    /// Expands the scenario into the commands that seed a fresh world.
    pub(crate) fn seed_commands(&self) -> Vec<Command> {
        let mut commands = vec![Command::ConfigureBoard {
            columns: self.columns,
            rows: self.rows,
        }];
        commands.extend(self.units.iter().map(|placement| Command::SpawnUnit {
            cell: CellCoord::new(placement.column, placement.row),
            side: placement.side,
            stats: placement.stats,
        }));
        commands
    }
}

fn stats(speed: u32, attack: u32) -> UnitStats {
    UnitStats {
        max_hp: Health::new(20),
        max_energy: Some(Energy::new(10)),
        speed: Speed::new(speed),
        range: 1,
        attack,
    }
}
