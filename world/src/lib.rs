#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Skirmish.
//!
//! The world owns the only mutable state in the engine: the board occupancy
//! grid and the unit roster. Adapters and systems mutate it exclusively
//! through [`apply`] and observe it through the read-only [`query`] module,
//! so every decision system works from a consistent snapshot.

use std::time::Duration;

use skirmish_core::{
    facing, turn_delay, CellCoord, Command, Direction, Energy, Event, Health, Occupant, Side,
    StepError, StrikeError, UnitId, UnitStats,
};

const DEFAULT_BOARD_COLUMNS: u32 = 8;
const DEFAULT_BOARD_ROWS: u32 = 8;

/// Hit points of damage required to accrue one point of energy.
const ENERGY_PER_DAMAGE: u32 = 10;
/// Energy gain from a single exchange is capped at this amount.
const MAX_ENERGY_GAIN: u32 = 2;

/// Represents the authoritative Skirmish world state.
#[derive(Debug)]
pub struct World {
    columns: u32,
    rows: u32,
    units: Vec<Unit>,
    occupancy: OccupancyGrid,
    next_unit: u32,
    tick_index: u64,
}

impl World {
    /// Creates a new Skirmish world ready for simulation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: DEFAULT_BOARD_COLUMNS,
            rows: DEFAULT_BOARD_ROWS,
            units: Vec::new(),
            occupancy: OccupancyGrid::new(DEFAULT_BOARD_COLUMNS, DEFAULT_BOARD_ROWS),
            next_unit: 0,
            tick_index: 0,
        }
    }

    fn unit_index(&self, unit_id: UnitId) -> Option<usize> {
        self.units.iter().position(|unit| unit.id == unit_id)
    }

    fn allocate_unit_id(&mut self) -> UnitId {
        let id = UnitId::new(self.next_unit);
        self.next_unit = self.next_unit.saturating_add(1);
        id
    }

    fn remove_unit(&mut self, index: usize) {
        let unit = self.units.remove(index);
        self.occupancy.vacate(unit.cell);
    }

    fn resolve_step(
        &mut self,
        unit_id: UnitId,
        direction: Direction,
    ) -> Result<Event, StepError> {
        let index = self.unit_index(unit_id).ok_or(StepError::MissingUnit)?;
        if !self.units[index].ready_for_turn() {
            return Err(StepError::NotReady);
        }

        let from = self.units[index].cell;
        let destination = from
            .step(direction, self.columns, self.rows)
            .ok_or(StepError::OutOfBounds)?;
        if !self.occupancy.can_enter(destination) {
            return Err(StepError::Occupied);
        }

        let side = self.units[index].side;
        self.occupancy.vacate(from);
        self.occupancy
            .occupy(Occupant { unit: unit_id, side }, destination);

        let unit = &mut self.units[index];
        unit.cell = destination;
        unit.spend_turn();

        Ok(Event::UnitMoved {
            unit: unit_id,
            from,
            to: destination,
            facing: direction,
        })
    }

    fn resolve_strike(
        &mut self,
        attacker_id: UnitId,
        target_id: UnitId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), StrikeError> {
        let attacker_index = self
            .unit_index(attacker_id)
            .ok_or(StrikeError::MissingAttacker)?;
        let target_index = self
            .unit_index(target_id)
            .ok_or(StrikeError::MissingTarget)?;

        let attacker = &self.units[attacker_index];
        let target = &self.units[target_index];

        if !attacker.ready_for_turn() {
            return Err(StrikeError::NotReady);
        }
        if !attacker.side.opposes(target.side) {
            return Err(StrikeError::SameSide);
        }

        let range = u64::from(attacker.stats.range);
        if attacker.cell.distance_squared(target.cell) > range * range {
            return Err(StrikeError::OutOfRange);
        }

        let amount = attacker.stats.attack;
        let attack_facing = facing(attacker.cell, target.cell);

        self.units[attacker_index].spend_turn();
        out_events.push(Event::UnitStruck {
            attacker: attacker_id,
            target: target_id,
            facing: attack_facing,
        });

        if let Some(event) = self.units[attacker_index].gain_energy(amount) {
            out_events.push(event);
        }
        if let Some(event) = self.units[target_index].gain_energy(amount) {
            out_events.push(event);
        }

        let target = &mut self.units[target_index];
        let actual = amount.min(target.hp.get());
        target.hp = target.hp.saturating_sub(amount);
        out_events.push(Event::UnitDamaged {
            unit: target_id,
            amount: actual,
            remaining: target.hp,
        });

        if target.hp.is_zero() {
            self.remove_unit(target_index);
            out_events.push(Event::UnitDefeated { unit: target_id });
        }

        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBoard { columns, rows } => {
            world.columns = columns;
            world.rows = rows;
            world.units.clear();
            world.occupancy = OccupancyGrid::new(columns, rows);
            world.next_unit = 0;
            world.tick_index = 0;
            out_events.push(Event::BoardConfigured { columns, rows });
        }
        Command::SpawnUnit { cell, side, stats } => {
            // Stale or overlapping spawn requests degrade to a no-op rather
            // than poisoning the roster.
            if cell.column() >= world.columns || cell.row() >= world.rows {
                return;
            }
            if !world.occupancy.can_enter(cell) {
                return;
            }

            let id = world.allocate_unit_id();
            world.units.push(Unit::spawned(id, side, cell, stats));
            world.occupancy.occupy(Occupant { unit: id, side }, cell);
            out_events.push(Event::UnitSpawned {
                unit: id,
                side,
                cell,
            });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            for unit in world.units.iter_mut() {
                unit.accumulator = unit.accumulator.saturating_add(dt);
            }
        }
        Command::StepUnit { unit, direction } => {
            match world.resolve_step(unit, direction) {
                Ok(event) => out_events.push(event),
                Err(reason) => out_events.push(Event::StepRejected {
                    unit,
                    direction,
                    reason,
                }),
            }
        }
        Command::Strike { attacker, target } => {
            if let Err(reason) = world.resolve_strike(attacker, target, out_events) {
                out_events.push(Event::StrikeRejected { attacker, reason });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use skirmish_core::{BoardView, Side, UnitId, UnitSnapshot, UnitView};

    /// Provides the dimensions of the configured board.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.columns, world.rows)
    }

    /// Number of ticks the world has processed since configuration.
    #[must_use]
    pub fn ticks(world: &World) -> u64 {
        world.tick_index
    }

    /// Exposes a read-only view of the dense board occupancy grid.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView<'_> {
        BoardView::new(world.occupancy.cells(), world.columns, world.rows)
    }

    /// Captures a read-only view of the units on the board.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.iter().map(super::Unit::snapshot).collect())
    }

    /// Retrieves a snapshot of a single unit, if it is still on the board.
    #[must_use]
    pub fn unit(world: &World, unit_id: UnitId) -> Option<UnitSnapshot> {
        world
            .units
            .iter()
            .find(|unit| unit.id == unit_id)
            .map(super::Unit::snapshot)
    }

    /// Counts the units that fight for the provided side.
    #[must_use]
    pub fn side_count(world: &World, side: Side) -> usize {
        world.units.iter().filter(|unit| unit.side == side).count()
    }
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    side: Side,
    cell: CellCoord,
    hp: Health,
    energy: Energy,
    stats: UnitStats,
    accumulator: Duration,
}

impl Unit {
    fn spawned(id: UnitId, side: Side, cell: CellCoord, stats: UnitStats) -> Self {
        Self {
            id,
            side,
            cell,
            hp: stats.max_hp,
            energy: Energy::new(0),
            stats,
            accumulator: Duration::ZERO,
        }
    }

    fn turn_delay(&self) -> Duration {
        turn_delay(self.stats.speed)
    }

    fn ready_for_turn(&self) -> bool {
        self.accumulator >= self.turn_delay()
    }

    fn spend_turn(&mut self) {
        self.accumulator = self.accumulator.saturating_sub(self.turn_delay());
    }

    /// Accrues energy from an exchange dealing `amount` damage.
    ///
    /// Both combatants charge the same way: one point per ten damage,
    /// rounded, capped at two per exchange and at the unit's energy cap.
    fn gain_energy(&mut self, amount: u32) -> Option<Event> {
        let cap = self.stats.max_energy?;
        if self.energy >= cap {
            return None;
        }

        let gain = MAX_ENERGY_GAIN.min((amount + ENERGY_PER_DAMAGE / 2) / ENERGY_PER_DAMAGE);
        if gain == 0 {
            return None;
        }

        self.energy = self.energy.gain_capped(gain, cap);
        Some(Event::EnergyGained {
            unit: self.id,
            energy: self.energy,
        })
    }

    fn snapshot(&self) -> skirmish_core::UnitSnapshot {
        skirmish_core::UnitSnapshot {
            id: self.id,
            side: self.side,
            cell: self.cell,
            hp: self.hp,
            energy: self.energy,
            stats: self.stats,
            ready_for_turn: self.ready_for_turn(),
            accumulated: self.accumulator,
        }
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<Occupant>>,
}

impl OccupancyGrid {
    fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    fn can_enter(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(false, |index| {
            self.cells.get(index).copied().unwrap_or(None).is_none()
        })
    }

    fn occupy(&mut self, occupant: Occupant, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Some(occupant);
            }
        }
    }

    fn vacate(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = None;
            }
        }
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

    fn cells(&self) -> &[Option<Occupant>] {
        &self.cells
    }
}
