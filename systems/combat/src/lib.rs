#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns board snapshots into strike and step commands.

use skirmish_core::{BoardView, CellCoord, Command, Direction, Event, UnitView};
use skirmish_system_pathfinding::next_step;
use skirmish_system_targeting::nearest_target;

/// Cells a unit may advance along its path in a single turn.
const MOVE_BUDGET: u32 = 1;

/// Combat driver that decides each ready unit's action for the tick.
///
/// For every unit that accrued a full turn the driver asks targeting for the
/// nearest enemy, strikes when the enemy is within reach, and otherwise
/// requests one step along the shortest unobstructed path toward it. Units
/// whose route is blocked simply wait; the world re-evaluates them next tick.
#[derive(Debug, Default)]
pub struct CombatDriver;

impl CombatDriver {
    /// Creates a new combat driver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes world events and immutable views to emit combat commands.
    ///
    /// Decisions are only made on ticks that advanced time, and units are
    /// visited in ascending identifier order so replays stay deterministic.
    pub fn handle(
        &mut self,
        events: &[Event],
        units: &UnitView,
        board: BoardView<'_>,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for unit in units.iter() {
            if !unit.ready_for_turn {
                continue;
            }

            let Some(target_cell) = nearest_target(board, unit.cell) else {
                continue;
            };

            let range = u64::from(unit.stats.range);
            if unit.cell.distance_squared(target_cell) <= range * range {
                let Some(target) = board.occupant(target_cell) else {
                    continue;
                };
                out.push(Command::Strike {
                    attacker: unit.id,
                    target: target.unit,
                });
                continue;
            }

            let Some(destination) = next_step(board, unit.cell, target_cell, MOVE_BUDGET) else {
                continue;
            };
            if destination == unit.cell {
                continue;
            }
            let Some(direction) = direction_between(unit.cell, destination) else {
                continue;
            };

            out.push(Command::StepUnit {
                unit: unit.id,
                direction,
            });
        }
    }
}

fn direction_between(from: CellCoord, to: CellCoord) -> Option<Direction> {
    let column_diff = from.column().abs_diff(to.column());
    let row_diff = from.row().abs_diff(to.row());
    if column_diff + row_diff != 1 {
        return None;
    }

    if column_diff == 1 {
        if to.column() > from.column() {
            Some(Direction::Right)
        } else {
            Some(Direction::Left)
        }
    } else if to.row() > from.row() {
        Some(Direction::Down)
    } else {
        Some(Direction::Up)
    }
}

#[cfg(test)]
mod tests {
    use super::{direction_between, CombatDriver};
    use skirmish_core::{
        BoardView, CellCoord, Command, Direction, Energy, Event, Health, Occupant, Side, Speed,
        UnitId, UnitSnapshot, UnitStats, UnitView,
    };
    use std::time::Duration;

    fn stats(range: u32) -> UnitStats {
        UnitStats {
            max_hp: Health::new(10),
            max_energy: Some(Energy::new(10)),
            speed: Speed::new(100),
            range,
            attack: 3,
        }
    }

    fn snapshot(id: u32, cell: (u32, u32), side: Side, range: u32, ready: bool) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            side,
            cell: CellCoord::new(cell.0, cell.1),
            hp: Health::new(10),
            energy: Energy::new(0),
            stats: stats(range),
            ready_for_turn: ready,
            accumulated: Duration::ZERO,
        }
    }

    fn board_cells(columns: u32, rows: u32, snapshots: &[UnitSnapshot]) -> Vec<Option<Occupant>> {
        let mut cells = vec![None; (columns * rows) as usize];
        for snapshot in snapshots {
            let offset = (snapshot.cell.row() * columns + snapshot.cell.column()) as usize;
            cells[offset] = Some(Occupant {
                unit: snapshot.id,
                side: snapshot.side,
            });
        }
        cells
    }

    fn tick_events() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(250),
        }]
    }

    #[test]
    fn strikes_when_the_enemy_is_in_reach() {
        let snapshots = vec![
            snapshot(0, (1, 1), Side::Player, 1, true),
            snapshot(1, (2, 1), Side::Enemy, 1, false),
        ];
        let cells = board_cells(3, 3, &snapshots);
        let units = UnitView::from_snapshots(snapshots);

        let mut driver = CombatDriver::new();
        let mut out = Vec::new();
        driver.handle(
            &tick_events(),
            &units,
            BoardView::new(&cells, 3, 3),
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::Strike {
                attacker: UnitId::new(0),
                target: UnitId::new(1),
            }]
        );
    }

    #[test]
    fn steps_toward_a_distant_enemy() {
        let snapshots = vec![
            snapshot(0, (0, 0), Side::Player, 1, true),
            snapshot(1, (3, 0), Side::Enemy, 1, false),
        ];
        let cells = board_cells(4, 1, &snapshots);
        let units = UnitView::from_snapshots(snapshots);

        let mut driver = CombatDriver::new();
        let mut out = Vec::new();
        driver.handle(
            &tick_events(),
            &units,
            BoardView::new(&cells, 4, 1),
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::StepUnit {
                unit: UnitId::new(0),
                direction: Direction::Right,
            }]
        );
    }

    #[test]
    fn waits_when_no_route_exists() {
        let snapshots = vec![
            snapshot(0, (0, 0), Side::Player, 1, true),
            snapshot(1, (1, 0), Side::Player, 1, false),
            snapshot(2, (2, 0), Side::Enemy, 1, false),
        ];
        let cells = board_cells(3, 1, &snapshots);
        let units = UnitView::from_snapshots(snapshots);

        let mut driver = CombatDriver::new();
        let mut out = Vec::new();
        driver.handle(
            &tick_events(),
            &units,
            BoardView::new(&cells, 3, 1),
            &mut out,
        );

        assert!(out.is_empty(), "a walled-in unit holds its turn");
    }

    #[test]
    fn idle_units_and_quiet_ticks_emit_nothing() {
        let snapshots = vec![
            snapshot(0, (0, 0), Side::Player, 1, false),
            snapshot(1, (2, 0), Side::Enemy, 1, false),
        ];
        let cells = board_cells(3, 1, &snapshots);
        let units = UnitView::from_snapshots(snapshots);

        let mut driver = CombatDriver::new();
        let mut out = Vec::new();

        // No TimeAdvanced in the batch: the driver must not act at all.
        driver.handle(&[], &units, BoardView::new(&cells, 3, 1), &mut out);
        assert!(out.is_empty());

        // Time advanced, but no unit is ready.
        driver.handle(
            &tick_events(),
            &units,
            BoardView::new(&cells, 3, 1),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn lone_survivors_idle_without_targets() {
        let snapshots = vec![snapshot(0, (1, 1), Side::Player, 1, true)];
        let cells = board_cells(3, 3, &snapshots);
        let units = UnitView::from_snapshots(snapshots);

        let mut driver = CombatDriver::new();
        let mut out = Vec::new();
        driver.handle(
            &tick_events(),
            &units,
            BoardView::new(&cells, 3, 3),
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn ranged_units_strike_without_closing_in() {
        let snapshots = vec![
            snapshot(0, (0, 0), Side::Player, 3, true),
            snapshot(1, (3, 0), Side::Enemy, 1, false),
        ];
        let cells = board_cells(4, 1, &snapshots);
        let units = UnitView::from_snapshots(snapshots);

        let mut driver = CombatDriver::new();
        let mut out = Vec::new();
        driver.handle(
            &tick_events(),
            &units,
            BoardView::new(&cells, 4, 1),
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::Strike {
                attacker: UnitId::new(0),
                target: UnitId::new(1),
            }]
        );
    }

    #[test]
    fn direction_between_neighbors() {
        let origin = CellCoord::new(3, 3);
        assert_eq!(
            direction_between(origin, CellCoord::new(3, 2)),
            Some(Direction::Up)
        );
        assert_eq!(
            direction_between(origin, CellCoord::new(4, 3)),
            Some(Direction::Right)
        );
        assert_eq!(
            direction_between(origin, CellCoord::new(3, 4)),
            Some(Direction::Down)
        );
        assert_eq!(
            direction_between(origin, CellCoord::new(2, 3)),
            Some(Direction::Left)
        );
        assert_eq!(direction_between(origin, origin), None);
        assert_eq!(direction_between(origin, CellCoord::new(5, 3)), None);
    }
}
