#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects the nearest opposing unit on a board snapshot.

use skirmish_core::{BoardView, CellCoord};

/// Finds the cell of the nearest unit opposing the occupant at `origin`.
///
/// Candidates rank by squared Euclidean distance; equidistant candidates
/// rank by the angle of their offset vector, swept from the positive-column
/// axis toward positive rows. Returns `None` when the origin cell is vacant
/// or no opposing unit stands on the board.
#[must_use]
pub fn nearest_target(board: BoardView<'_>, origin: CellCoord) -> Option<CellCoord> {
    let origin_side = board.occupant(origin)?.side;
    let (columns, rows) = board.dimensions();

    let mut best: Option<Candidate> = None;
    for row in 0..rows {
        for column in 0..columns {
            let cell = CellCoord::new(column, row);
            let Some(occupant) = board.occupant(cell) else {
                continue;
            };
            if !origin_side.opposes(occupant.side) {
                continue;
            }

            let candidate = Candidate::capture(origin, cell);
            best = Some(match best {
                None => candidate,
                Some(existing) => {
                    if candidate.precedes(&existing) {
                        candidate
                    } else {
                        existing
                    }
                }
            });
        }
    }

    best.map(|candidate| candidate.cell)
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    cell: CellCoord,
    distance_squared: u64,
    offset: SweepVector,
}

impl Candidate {
    fn capture(origin: CellCoord, cell: CellCoord) -> Self {
        Self {
            cell,
            distance_squared: origin.distance_squared(cell),
            offset: SweepVector {
                dx: i64::from(cell.column()) - i64::from(origin.column()),
                dy: i64::from(cell.row()) - i64::from(origin.row()),
            },
        }
    }

    fn precedes(&self, other: &Self) -> bool {
        if self.distance_squared != other.distance_squared {
            return self.distance_squared < other.distance_squared;
        }

        self.offset.sweep_precedes(other.offset)
    }
}

/// Offset vector compared by sweep angle with exact integer arithmetic.
#[derive(Clone, Copy, Debug)]
struct SweepVector {
    dx: i64,
    dy: i64,
}

impl SweepVector {
    /// Splits the plane at the sweep origin so that vectors within one half
    /// span less than a half turn and a cross product orders them exactly.
    fn sweep_half(self) -> u8 {
        if self.dy > 0 || (self.dy == 0 && self.dx > 0) {
            0
        } else {
            1
        }
    }

    fn sweep_precedes(self, other: SweepVector) -> bool {
        let half = self.sweep_half();
        let other_half = other.sweep_half();
        if half != other_half {
            return half < other_half;
        }

        self.dx * other.dy - self.dy * other.dx > 0
    }
}
