#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that plans the next step toward a goal cell.

use std::collections::VecDeque;

use skirmish_core::{BoardView, CellCoord, Direction};

const NEIGHBOR_ORDER: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

/// Computes the cell a unit at `start` should move to this turn.
///
/// Runs a breadth-first search over 4-directional adjacency, treating every
/// occupied cell as impassable except `start` and `goal` themselves, and
/// advances at most `step_budget` cells along the discovered shortest path.
/// The goal cell is never proposed as a destination: a unit stops on the
/// cell just before it, since the goal holds the enemy being approached.
/// Returns `None` when no route exists.
#[must_use]
pub fn next_step(
    board: BoardView<'_>,
    start: CellCoord,
    goal: CellCoord,
    step_budget: u32,
) -> Option<CellCoord> {
    let (columns, rows) = board.dimensions();
    if !in_bounds(start, columns, rows) || !in_bounds(goal, columns, rows) {
        return None;
    }
    if start == goal {
        return None;
    }

    let width = usize::try_from(columns).ok()?;
    let height = usize::try_from(rows).ok()?;
    let cell_count = width.checked_mul(height)?;

    let mut parents: Vec<Option<CellCoord>> = vec![None; cell_count];
    let mut visited = vec![false; cell_count];
    visited[index(width, start)?] = true;

    let mut frontier = VecDeque::new();
    frontier.push_back(start);

    while let Some(cell) = frontier.pop_front() {
        for direction in NEIGHBOR_ORDER {
            let Some(neighbor) = cell.step(direction, columns, rows) else {
                continue;
            };
            let neighbor_index = index(width, neighbor)?;
            if visited[neighbor_index] {
                continue;
            }
            if neighbor != goal && !board.is_free(neighbor) {
                continue;
            }

            visited[neighbor_index] = true;
            parents[neighbor_index] = Some(cell);

            if neighbor == goal {
                return advance_along(&parents, width, start, goal, step_budget);
            }

            frontier.push_back(neighbor);
        }
    }

    None
}

/// Walks the parent chain back from the goal and picks the cell reached
/// after `step_budget` moves, stopping one short of the goal itself.
fn advance_along(
    parents: &[Option<CellCoord>],
    width: usize,
    start: CellCoord,
    goal: CellCoord,
    step_budget: u32,
) -> Option<CellCoord> {
    let mut path = vec![goal];
    let mut cursor = goal;
    while cursor != start {
        cursor = parents[index(width, cursor)?]?;
        path.push(cursor);
    }
    path.reverse();

    let last_before_goal = path.len().checked_sub(2)?;
    let budget = usize::try_from(step_budget).unwrap_or(usize::MAX);
    Some(path[budget.min(last_before_goal)])
}

fn in_bounds(cell: CellCoord, columns: u32, rows: u32) -> bool {
    cell.column() < columns && cell.row() < rows
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::next_step;
    use skirmish_core::{BoardView, CellCoord, Occupant, Side, UnitId};

    fn cells(
        columns: u32,
        rows: u32,
        occupied: &[(u32, u32)],
    ) -> Vec<Option<Occupant>> {
        let mut cells = vec![None; (columns * rows) as usize];
        for (index, &(column, row)) in occupied.iter().enumerate() {
            let offset = (row * columns + column) as usize;
            cells[offset] = Some(Occupant {
                unit: UnitId::new(index as u32),
                side: if index % 2 == 0 {
                    Side::Player
                } else {
                    Side::Enemy
                },
            });
        }
        cells
    }

    fn step(
        columns: u32,
        rows: u32,
        occupied: &[(u32, u32)],
        start: (u32, u32),
        goal: (u32, u32),
        budget: u32,
    ) -> Option<CellCoord> {
        let cells = cells(columns, rows, occupied);
        next_step(
            BoardView::new(&cells, columns, rows),
            CellCoord::new(start.0, start.1),
            CellCoord::new(goal.0, goal.1),
            budget,
        )
    }

    #[test]
    fn finds_a_path_between_two_points() {
        let next = step(3, 3, &[(0, 0), (2, 0)], (0, 0), (2, 0), 1);
        assert_eq!(next, Some(CellCoord::new(1, 0)));
    }

    #[test]
    fn finds_a_path_between_distant_points() {
        let next = step(3, 3, &[(0, 0), (2, 2)], (0, 0), (2, 2), 1);
        assert_eq!(next, Some(CellCoord::new(1, 0)));
    }

    #[test]
    fn goes_around_obstacles() {
        let next = step(3, 3, &[(0, 0), (1, 0), (2, 2)], (0, 0), (2, 2), 1);
        assert_eq!(next, Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn returns_none_when_no_route_exists() {
        let next = step(
            3,
            3,
            &[(0, 0), (0, 1), (1, 0), (2, 0), (2, 2)],
            (0, 0),
            (2, 2),
            1,
        );
        assert_eq!(next, None);
    }

    #[test]
    fn returns_none_when_the_goal_is_boxed_in() {
        let next = step(
            4,
            4,
            &[(0, 0), (3, 3), (2, 3), (3, 2)],
            (0, 0),
            (3, 3),
            1,
        );
        assert_eq!(next, None);
    }

    #[test]
    fn spends_the_whole_step_budget_on_long_paths() {
        let next = step(5, 1, &[(0, 0), (4, 0)], (0, 0), (4, 0), 2);
        assert_eq!(next, Some(CellCoord::new(2, 0)));
    }

    #[test]
    fn stops_on_the_cell_before_the_goal() {
        let next = step(3, 1, &[(0, 0), (2, 0)], (0, 0), (2, 0), 5);
        assert_eq!(next, Some(CellCoord::new(1, 0)));
    }

    #[test]
    fn holds_position_when_already_adjacent() {
        let next = step(2, 1, &[(0, 0), (1, 0)], (0, 0), (1, 0), 1);
        assert_eq!(next, Some(CellCoord::new(0, 0)));
    }

    #[test]
    fn routes_through_corridors() {
        // A wall with a single gap forces the detour through (1, 2).
        let next = step(
            3,
            3,
            &[(0, 0), (1, 0), (1, 1), (2, 0)],
            (0, 0),
            (2, 0),
            1,
        );
        assert_eq!(next, Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn treats_other_units_as_walls_regardless_of_side() {
        // The blocking pair alternates sides in the fixture; both block.
        let next = step(3, 1, &[(0, 0), (1, 0), (2, 0)], (0, 0), (2, 0), 1);
        assert_eq!(next, None);
    }

    #[test]
    fn returns_none_for_degenerate_queries() {
        assert_eq!(step(3, 3, &[(1, 1)], (1, 1), (1, 1), 1), None);
        assert_eq!(step(3, 3, &[(0, 0)], (0, 0), (5, 5), 1), None);
    }
}
