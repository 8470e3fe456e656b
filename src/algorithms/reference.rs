//! Independent optimal-cost oracle built on the `pathfinding` crate.
//!
//! Uses the same move rules as the search (eight directions, corners cut only
//! past a single blocked flank) but looks at walls alone, so it can be run on
//! a grid a search has already marked up.

use crate::algorithms::common::{corner_passable, neighbor, DIRECTIONS};
use crate::grid::{Grid, Position};
use pathfinding::prelude::dijkstra;

/// Fixed-point scale for step costs.
const SCALE: f64 = 1_000_000.0;
const AXIS_COST: u64 = 1_000_000;
const DIAGONAL_COST: u64 = 1_414_214; // round(sqrt(2) * SCALE)

fn successors(grid: &Grid, pos: Position) -> Vec<(Position, u64)> {
    DIRECTIONS
        .iter()
        .filter_map(|&direction| {
            let next = neighbor(grid, pos, direction)?;
            if grid.is_blocked(next) || !corner_passable(grid, pos, direction) {
                return None;
            }
            let cost = if direction.0 != 0 && direction.1 != 0 {
                DIAGONAL_COST
            } else {
                AXIS_COST
            };
            Some((next, cost))
        })
        .collect()
}

/// Cheapest path from `start` to `goal` and its cost, or `None` when the goal
/// is unreachable or either endpoint lies off the grid.
pub fn optimal_path(grid: &Grid, start: Position, goal: Position) -> Option<(Vec<Position>, f64)> {
    if !grid.contains(start) || !grid.contains(goal) {
        return None;
    }
    let (path, cost) = dijkstra(&start, |&p| successors(grid, p), |&p| p == goal)?;
    Some((path, cost as f64 / SCALE))
}

/// Cost of the cheapest path from `start` to `goal`, if one exists.
pub fn optimal_cost(grid: &Grid, start: Position, goal: Position) -> Option<f64> {
    optimal_path(grid, start, goal).map(|(_, cost)| cost)
}
