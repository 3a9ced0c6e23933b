#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const BASE_TURN_DELAY_MILLIS: u64 = 1_000;
const MIN_SPEED: u32 = 50;
const MAX_SPEED: u32 = 200;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Configures the board's cell grid using the provided dimensions.
    ConfigureBoard {
        /// Number of cell columns laid out on the board.
        columns: u32,
        /// Number of cell rows laid out on the board.
        rows: u32,
    },
    /// Requests that a unit join the battle at the provided cell.
    SpawnUnit {
        /// Cell the unit should occupy after spawning.
        cell: CellCoord,
        /// Allegiance assigned to the unit.
        side: Side,
        /// Combat statistics supplied by the caller's data model.
        stats: UnitStats,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a unit advance a single cell in the specified direction.
    StepUnit {
        /// Identifier of the unit attempting to move.
        unit: UnitId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that a unit attack an opposing unit within its reach.
    Strike {
        /// Identifier of the attacking unit.
        attacker: UnitId,
        /// Identifier of the unit being attacked.
        target: UnitId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the board was reconfigured and the roster cleared.
    BoardConfigured {
        /// Number of cell columns laid out on the board.
        columns: u32,
        /// Number of cell rows laid out on the board.
        rows: u32,
    },
    /// Confirms that a unit was placed onto the board.
    UnitSpawned {
        /// Identifier assigned to the unit by the world.
        unit: UnitId,
        /// Allegiance assigned to the unit.
        side: Side,
        /// Cell the unit occupies after spawning.
        cell: CellCoord,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a unit moved between two cells.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: CellCoord,
        /// Cell the unit occupies after completing the move.
        to: CellCoord,
        /// Facing the unit adopts while travelling, for sprite orientation.
        facing: Direction,
    },
    /// Announces that an attack landed, before its damage is resolved.
    UnitStruck {
        /// Identifier of the attacking unit.
        attacker: UnitId,
        /// Identifier of the unit being attacked.
        target: UnitId,
        /// Facing the attacker adopts toward its target.
        facing: Direction,
    },
    /// Reports the damage a unit suffered.
    UnitDamaged {
        /// Identifier of the damaged unit.
        unit: UnitId,
        /// Hit points removed by the attack.
        amount: u32,
        /// Hit points the unit retains after the attack.
        remaining: Health,
    },
    /// Reports energy gained by a combatant during an exchange.
    EnergyGained {
        /// Identifier of the unit that gained energy.
        unit: UnitId,
        /// Energy total after the gain.
        energy: Energy,
    },
    /// Announces that a unit ran out of hit points and left the board.
    UnitDefeated {
        /// Identifier of the defeated unit.
        unit: UnitId,
    },
    /// Reports that a step request was rejected.
    StepRejected {
        /// Identifier of the unit that attempted to move.
        unit: UnitId,
        /// Direction requested for the rejected step.
        direction: Direction,
        /// Specific reason the step failed.
        reason: StepError,
    },
    /// Reports that a strike request was rejected.
    StrikeRejected {
        /// Identifier of the unit that attempted to attack.
        attacker: UnitId,
        /// Specific reason the strike failed.
        reason: StrikeError,
    },
}

/// Reasons a step request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum StepError {
    /// No unit with the provided identifier exists.
    #[error("unit does not exist")]
    MissingUnit,
    /// The unit has not yet accumulated a full turn.
    #[error("unit is not ready to act")]
    NotReady,
    /// The destination lies outside the configured board.
    #[error("destination is out of bounds")]
    OutOfBounds,
    /// The destination cell already holds another unit.
    #[error("destination is occupied")]
    Occupied,
}

/// Reasons a strike request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum StrikeError {
    /// No attacking unit with the provided identifier exists.
    #[error("attacker does not exist")]
    MissingAttacker,
    /// No target unit with the provided identifier exists.
    #[error("target does not exist")]
    MissingTarget,
    /// The attacker has not yet accumulated a full turn.
    #[error("attacker is not ready to act")]
    NotReady,
    /// The target belongs to the attacker's own side.
    #[error("target is an ally")]
    SameSide,
    /// The target lies beyond the attacker's reach.
    #[error("target is out of range")]
    OutOfRange,
}

/// Allegiance grouping; targeting only crosses between differing sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Units fielded by the player.
    Player,
    /// Units fielded by the opposing wave.
    Enemy,
}

impl Side {
    /// Reports whether the other side counts as a valid attack target.
    #[must_use]
    pub const fn opposes(self, other: Side) -> bool {
        !matches!(
            (self, other),
            (Side::Player, Side::Player) | (Side::Enemy, Side::Enemy)
        )
    }
}

/// Cardinal facings a unit can visually adopt.
///
/// The board uses screen orientation: row zero is the top edge, so `Up`
/// points toward decreasing row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Facing toward decreasing row indices.
    Up,
    /// Facing toward increasing row indices.
    Down,
    /// Facing toward decreasing column indices.
    Left,
    /// Facing toward increasing column indices.
    Right,
}

impl Direction {
    /// Column and row displacement of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Hit point total carried by a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new hit point total.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying hit point count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Removes up to `amount` hit points, flooring at zero.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Energy total a unit accrues toward its charged move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Energy(u32);

impl Energy {
    /// Creates a new energy total.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying energy count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Adds `amount` energy without exceeding the provided cap.
    #[must_use]
    pub fn gain_capped(self, amount: u32, cap: Energy) -> Self {
        Self(self.0.saturating_add(amount).min(cap.0))
    }
}

/// Movement and attack speed stat supplied by the unit data model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Speed(u32);

impl Speed {
    /// Creates a new speed stat wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying speed value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Combat statistics a unit carries onto the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Hit points the unit starts with.
    pub max_hp: Health,
    /// Energy cap, or `None` for units that never charge a move.
    pub max_energy: Option<Energy>,
    /// Speed stat that paces the unit's turns.
    pub speed: Speed,
    /// Attack reach measured in cells.
    pub range: u32,
    /// Hit points removed by each basic attack.
    pub attack: u32,
}

/// Location of a single board cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Computes the squared Euclidean distance between two cell coordinates.
    ///
    /// Squared distances rank candidates exactly with integer arithmetic, so
    /// targeting never depends on floating point rounding.
    #[must_use]
    pub fn distance_squared(self, other: CellCoord) -> u64 {
        let dx = u64::from(self.column.abs_diff(other.column));
        let dy = u64::from(self.row.abs_diff(other.row));
        dx * dx + dy * dy
    }

    /// Displaces the cell a single step, staying within the provided bounds.
    #[must_use]
    pub fn step(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let column = i64::from(self.column).checked_add(dx)?;
        let row = i64::from(self.row).checked_add(dy)?;
        if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
            return None;
        }

        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        Some(CellCoord::new(column, row))
    }
}

/// Unit identity the pure decision systems need: who stands where, and for
/// which side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupant {
    /// Identifier of the unit occupying the cell.
    pub unit: UnitId,
    /// Allegiance of the occupying unit.
    pub side: Side,
}

/// Read-only view into the dense board occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    cells: &'a [Option<Occupant>],
    columns: u32,
    rows: u32,
}

impl<'a> BoardView<'a> {
    /// Captures a new board view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<Occupant>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the unit occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<Occupant> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell lies in bounds and is free for traversal.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .is_some_and(|index| self.cells.get(index).copied().unwrap_or(None).is_none())
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Option<Occupant>> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying board.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Allegiance the unit fights for.
    pub side: Side,
    /// Board cell currently occupied by the unit.
    pub cell: CellCoord,
    /// Hit points the unit retains.
    pub hp: Health,
    /// Energy the unit has accrued.
    pub energy: Energy,
    /// Combat statistics the unit carries.
    pub stats: UnitStats,
    /// Indicates whether the unit accrued enough time to act.
    pub ready_for_turn: bool,
    /// Duration accumulated toward the next turn.
    pub accumulated: Duration,
}

/// Read-only snapshot describing all units on the board.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Computes the facing of the vector between two cells.
///
/// The axis with the larger magnitude wins; exact diagonals resolve to the
/// vertical axis. The zero vector falls back to `Down`, the idle facing, so
/// the function stays total even for input callers should never produce.
#[must_use]
pub fn facing(from: CellCoord, to: CellCoord) -> Direction {
    let dx = i64::from(to.column()) - i64::from(from.column());
    let dy = i64::from(to.row()) - i64::from(from.row());

    if dx.abs() > dy.abs() {
        if dx > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy < 0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

/// Derives the duration of one full turn from a unit's speed stat.
///
/// Pure and stateless: speed 100 yields the one second baseline, and the
/// stat is clamped to `[50, 200]` so extreme values cannot stall or spin the
/// simulation. Higher speed always means a shorter delay.
#[must_use]
pub fn turn_delay(speed: Speed) -> Duration {
    let clamped = speed.get().clamp(MIN_SPEED, MAX_SPEED);
    Duration::from_millis(BASE_TURN_DELAY_MILLIS * 100 / u64::from(clamped))
}

/// Duration presentation layers should spend tweening a single-cell move.
///
/// Three quarters of the turn delay, leaving the remainder as a visual rest
/// before the unit acts again.
#[must_use]
pub fn step_animation_duration(speed: Speed) -> Duration {
    turn_delay(speed) * 3 / 4
}
