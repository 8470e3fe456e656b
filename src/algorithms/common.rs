use crate::error::Result;
use crate::grid::{Cell, Grid, Position};

/// The eight directions one can move from a cell, as `(dx, dy)` offsets.
pub const DIRECTIONS: [(isize, isize); 8] = [
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
];

pub trait PathfindingAlgorithm {
    /// Find the cheapest path from `start` to `goal`, both included.
    ///
    /// An empty path means the goal is unreachable. Implementations may write
    /// search progress into `grid`.
    fn find_path(&mut self, grid: &mut Grid, start: Position, goal: Position)
        -> Result<Vec<Position>>;
}

/// Euclidean distance between two cells.
#[inline]
pub fn distance(a: Position, b: Position) -> f64 {
    let dx = a.x as f64 - b.x as f64;
    let dy = a.y as f64 - b.y as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Total Euclidean length of a path.
pub fn path_cost(path: &[Position]) -> f64 {
    path.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// The cell one step from `pos` in `direction`, if it lies on the grid.
pub fn neighbor(grid: &Grid, pos: Position, direction: (isize, isize)) -> Option<Position> {
    let next = Position {
        x: pos.x.checked_add_signed(direction.0)?,
        y: pos.y.checked_add_signed(direction.1)?,
    };
    grid.contains(next).then_some(next)
}

/// Whether a diagonal step from `pos` slips past its corner.
///
/// A diagonal move is refused only when both orthogonal cells it passes
/// between are blocked; one blocked flank still lets it through. Axis moves
/// always pass.
pub fn corner_passable(grid: &Grid, pos: Position, direction: (isize, isize)) -> bool {
    let (dx, dy) = direction;
    if dx == 0 || dy == 0 {
        return true;
    }
    let flank_x = neighbor(grid, pos, (dx, 0));
    let flank_y = neighbor(grid, pos, (0, dy));
    match (flank_x, flank_y) {
        (Some(a), Some(b)) => !(grid.is_blocked(a) && grid.is_blocked(b)),
        _ => true,
    }
}

/// Whether the search may step from `pos` in `direction`: the target is on the
/// grid, neither blocked nor closed, and the move does not cut a blocked corner.
pub fn is_accessible(grid: &Grid, pos: Position, direction: (isize, isize)) -> bool {
    match neighbor(grid, pos, direction).and_then(|next| grid.get(next)) {
        Some(Cell::Blocked | Cell::Closed) | None => false,
        Some(_) => corner_passable(grid, pos, direction),
    }
}

/// All positions the search may expand into from `pos`.
pub fn valid_neighbors(grid: &Grid, pos: Position) -> Vec<Position> {
    DIRECTIONS
        .iter()
        .filter(|&&direction| is_accessible(grid, pos, direction))
        .filter_map(|&direction| neighbor(grid, pos, direction))
        .collect()
}
