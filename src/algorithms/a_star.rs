use crate::algorithms::common::{distance, valid_neighbors, PathfindingAlgorithm};
use crate::error::Result;
use crate::grid::{Cell, Grid, Position};
use crate::statistics::SearchStats;
use log::{debug, info, trace};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::thread;
use std::time::{Duration, Instant};

/// A search record for one discovered cell.
#[derive(Debug, Clone)]
struct Node {
    pos: Position,
    g: f64, // Cost from start
    h: f64, // Straight-line estimate to goal, fixed at creation
    f: f64, // g + h
    parent: Option<usize>,
}

/// Frontier entry. Ordered in reverse on `f` so the `BinaryHeap` pops the
/// cheapest node first; equal `f` values pop in insertion order.
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    f: f64,
    seq: u64,
    node: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Outcome of a single expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A node was closed and its neighbors discovered; the search goes on.
    Expanded(Position),
    /// The goal was closed. The path runs from start to goal inclusive.
    Found(Vec<Position>),
    /// The frontier emptied without reaching the goal.
    Exhausted,
}

/// An A* search in progress over a caller-owned grid.
///
/// The grid is borrowed one step at a time so a caller can release it
/// between expansions. Each expansion marks the expanded cell `Closed` and
/// newly discovered cells `Open`; blocked cells are never rewritten.
///
/// Closed cells are never re-opened. With the Euclidean heuristic and
/// Euclidean step costs the heuristic is consistent, so the first time a
/// cell closes its cost is already optimal.
#[derive(Debug)]
pub struct AStarSearch {
    start: Position,
    goal: Position,
    nodes: Vec<Node>,
    frontier: BinaryHeap<FrontierEntry>,
    // Position -> index into `nodes` for every node still in the frontier.
    open: FxHashMap<Position, usize>,
    seq: u64,
    stats: SearchStats,
    done: bool,
}

impl AStarSearch {
    /// Prepare a search from `start` to `goal`. Fails if either lies off the grid.
    pub fn new(grid: &Grid, start: Position, goal: Position) -> Result<Self> {
        grid.check_bounds(start)?;
        grid.check_bounds(goal)?;
        debug!("[AStar] search: start={} goal={}", start, goal);

        let mut search = AStarSearch {
            start,
            goal,
            nodes: Vec::new(),
            frontier: BinaryHeap::new(),
            open: FxHashMap::default(),
            seq: 0,
            stats: SearchStats::default(),
            done: false,
        };
        // The start node carries no heuristic: g = h = f = 0.
        search.nodes.push(Node {
            pos: start,
            g: 0.0,
            h: 0.0,
            f: 0.0,
            parent: None,
        });
        search.push_frontier(0);
        search.open.insert(start, 0);
        Ok(search)
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn frontier_len(&self) -> usize {
        self.open.len()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Expand the most promising frontier node.
    ///
    /// Once the search has returned `Found` or `Exhausted`, further calls
    /// return `Exhausted` without touching the grid.
    pub fn step(&mut self, grid: &mut Grid) -> Step {
        if self.done {
            return Step::Exhausted;
        }

        let Some(current) = self.pop_frontier() else {
            self.done = true;
            debug!(
                "[AStar] no path from {} to {} after {} expansions",
                self.start, self.goal, self.stats.expanded
            );
            return Step::Exhausted;
        };

        let pos = self.nodes[current].pos;
        if grid.get(pos) != Some(Cell::Blocked) {
            // In bounds: every node position was checked on discovery.
            let _ = grid.set(pos, Cell::Closed);
        }
        self.stats.expanded += 1;
        trace!(
            "[AStar] expand {} g={:.3} f={:.3}",
            pos,
            self.nodes[current].g,
            self.nodes[current].f
        );

        if pos == self.goal {
            self.done = true;
            let path = self.reconstruct(current);
            self.stats.path_len = path.len();
            self.stats.path_cost = Some(self.nodes[current].g);
            info!(
                "[AStar] length of shortest path: {:.3} ({} cells, {} expansions)",
                self.nodes[current].g,
                path.len(),
                self.stats.expanded
            );
            return Step::Found(path);
        }

        let g = self.nodes[current].g;
        for next in valid_neighbors(grid, pos) {
            let tentative = g + distance(pos, next);
            if self.discover(next, tentative, current) {
                let _ = grid.set(next, Cell::Open);
            }
        }

        Step::Expanded(pos)
    }

    /// Step until the search finishes. Returns the path, or an empty path
    /// when the goal is unreachable.
    pub fn run(&mut self, grid: &mut Grid) -> Vec<Position> {
        self.run_paced(grid, Duration::ZERO)
    }

    /// Like [`run`](Self::run), sleeping `delay` before every expansion.
    pub fn run_paced(&mut self, grid: &mut Grid, delay: Duration) -> Vec<Position> {
        loop {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            match self.step(grid) {
                Step::Expanded(_) => continue,
                Step::Found(path) => return path,
                Step::Exhausted => return Vec::new(),
            }
        }
    }

    /// Record a route to `pos` costing `g` through `parent`.
    ///
    /// A position not yet in the frontier gets a new node; a frontier node is
    /// re-linked only when `g` is strictly cheaper. Returns `true` when a new
    /// node was created.
    fn discover(&mut self, pos: Position, g: f64, parent: usize) -> bool {
        if let Some(&idx) = self.open.get(&pos) {
            let node = &mut self.nodes[idx];
            if g < node.g {
                node.g = g;
                node.f = g + node.h;
                node.parent = Some(parent);
                self.stats.relaxed += 1;
                self.push_frontier(idx);
            }
            return false;
        }

        let h = distance(pos, self.goal);
        let idx = self.nodes.len();
        self.nodes.push(Node {
            pos,
            g,
            h,
            f: g + h,
            parent: Some(parent),
        });
        self.open.insert(pos, idx);
        self.push_frontier(idx);
        self.stats.opened += 1;
        true
    }

    fn push_frontier(&mut self, node: usize) {
        self.frontier.push(FrontierEntry {
            f: self.nodes[node].f,
            seq: self.seq,
            node,
        });
        self.seq += 1;
    }

    /// Pop the cheapest live frontier node, dropping entries left behind by
    /// relaxation.
    fn pop_frontier(&mut self) -> Option<usize> {
        while let Some(entry) = self.frontier.pop() {
            let node = &self.nodes[entry.node];
            let live = self.open.get(&node.pos) == Some(&entry.node) && entry.f == node.f;
            if live {
                self.open.remove(&node.pos);
                return Some(entry.node);
            }
        }
        None
    }

    fn reconstruct(&self, goal: usize) -> Vec<Position> {
        let mut path = Vec::new();
        let mut cursor = Some(goal);
        while let Some(idx) = cursor {
            path.push(self.nodes[idx].pos);
            cursor = self.nodes[idx].parent;
        }
        path.reverse();
        path
    }
}

/// A* over the eight-connected grid with Euclidean costs.
#[derive(Debug, Default)]
pub struct AStar {
    delay: Duration,
    last_stats: Option<SearchStats>,
}

impl AStar {
    pub fn new() -> Self {
        AStar::default()
    }

    /// Pause this long before every expansion so observers can watch.
    pub fn with_delay(delay: Duration) -> Self {
        AStar {
            delay,
            last_stats: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Statistics of the most recent completed search.
    pub fn last_stats(&self) -> Option<&SearchStats> {
        self.last_stats.as_ref()
    }
}

impl PathfindingAlgorithm for AStar {
    fn find_path(
        &mut self,
        grid: &mut Grid,
        start: Position,
        goal: Position,
    ) -> Result<Vec<Position>> {
        let started = Instant::now();
        let mut search = AStarSearch::new(grid, start, goal)?;
        let path = search.run_paced(grid, self.delay);

        let mut stats = search.stats().clone();
        stats.elapsed = started.elapsed();
        self.last_stats = Some(stats);
        Ok(path)
    }
}

/// Find the cheapest path from `start` to `goal`, writing search progress
/// into `grid`.
///
/// Returns an empty path when the goal cannot be reached and
/// `SearchError::InvalidArgument` when either endpoint is off the grid.
/// Cells left `Closed` by an earlier search act as walls; call
/// [`Grid::clear_search_state`] first when reusing a grid.
pub fn search(grid: &mut Grid, start: Position, goal: Position) -> Result<Vec<Position>> {
    AStar::new().find_path(grid, start, goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::common::path_cost;
    use crate::error::SearchError;
    use std::f64::consts::SQRT_2;

    fn p(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    fn grid_with_walls(width: usize, height: usize, walls: &[(usize, usize)]) -> Grid {
        let mut grid = Grid::new(width, height);
        for &w in walls {
            grid.set(w.into(), Cell::Blocked).unwrap();
        }
        grid
    }

    fn assert_open_nodes_consistent(search: &AStarSearch) {
        for &idx in search.open.values() {
            let node = &search.nodes[idx];
            assert_eq!(node.f, node.g + node.h, "f drifted at {}", node.pos);
        }
    }

    #[test]
    fn open_three_by_three_goes_diagonal() {
        let mut grid = Grid::new(3, 3);
        let path = search(&mut grid, p(0, 0), p(2, 2)).unwrap();
        assert_eq!(path, vec![p(0, 0), p(1, 1), p(2, 2)]);
        assert!((path_cost(&path) - 2.0 * SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn start_equal_to_goal_is_single_cell() {
        let mut grid = Grid::new(3, 3);
        let path = search(&mut grid, p(1, 2), p(1, 2)).unwrap();
        assert_eq!(path, vec![p(1, 2)]);
        assert_eq!(grid.get(p(1, 2)), Some(Cell::Closed));
    }

    #[test]
    fn enclosed_goal_yields_empty_path() {
        let ring = [
            (3, 3),
            (4, 3),
            (5, 3),
            (3, 4),
            (5, 4),
            (3, 5),
            (4, 5),
            (5, 5),
        ];
        let mut grid = grid_with_walls(8, 8, &ring);
        let path = search(&mut grid, p(0, 0), p(4, 4)).unwrap();
        assert!(path.is_empty());
        // Every reachable cell was closed before giving up.
        assert_eq!(grid.count(Cell::Open), 0);
        assert_eq!(grid.count(Cell::Closed), 64 - ring.len() - 1);
    }

    #[test]
    fn blocked_center_and_flanks_force_detour() {
        let mut grid = grid_with_walls(3, 3, &[(1, 1), (0, 1), (1, 0)]);
        let path = search(&mut grid, p(0, 0), p(2, 2)).unwrap();
        // The start is sealed in: every way out is a wall or a cut corner.
        assert!(path.is_empty());

        let mut grid = grid_with_walls(3, 3, &[(1, 1), (0, 1)]);
        let path = search(&mut grid, p(0, 0), p(2, 2)).unwrap();
        assert_eq!(path, vec![p(0, 0), p(1, 0), p(2, 1), p(2, 2)]);
        assert!(path_cost(&path) > 2.0 * SQRT_2);
    }

    #[test]
    fn single_blocked_flank_allows_diagonal() {
        // Walls above and right of the diagonal step into (1,1) only on one side.
        let mut grid = grid_with_walls(2, 2, &[(1, 0)]);
        let path = search(&mut grid, p(0, 0), p(1, 1)).unwrap();
        assert_eq!(path, vec![p(0, 0), p(1, 1)]);

        let mut grid = grid_with_walls(2, 2, &[(1, 0), (0, 1)]);
        let path = search(&mut grid, p(0, 0), p(1, 1)).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn out_of_bounds_endpoints_are_invalid() {
        let mut grid = Grid::new(3, 3);
        let err = search(&mut grid, p(3, 0), p(1, 1)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument { position, .. } if position == p(3, 0)));
        let err = search(&mut grid, p(0, 0), p(0, 9)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument { position, .. } if position == p(0, 9)));
        // Nothing was written.
        assert_eq!(grid.count(Cell::Unblocked), 9);
    }

    #[test]
    fn statuses_flow_from_open_to_closed() {
        let mut grid = Grid::new(5, 5);
        let mut search = AStarSearch::new(&grid, p(0, 0), p(4, 4)).unwrap();

        assert_eq!(search.step(&mut grid), Step::Expanded(p(0, 0)));
        assert_eq!(grid.get(p(0, 0)), Some(Cell::Closed));
        assert_eq!(grid.get(p(1, 1)), Some(Cell::Open));
        assert_eq!(grid.get(p(1, 0)), Some(Cell::Open));
        assert_eq!(grid.get(p(2, 2)), Some(Cell::Unblocked));
        assert_eq!(search.frontier_len(), 3);

        let path = search.run(&mut grid);
        assert_eq!(path.first(), Some(&p(0, 0)));
        assert_eq!(path.last(), Some(&p(4, 4)));
        assert!(search.is_done());
        assert_eq!(search.step(&mut grid), Step::Exhausted);
    }

    #[test]
    fn relaxation_relinks_and_keeps_f_consistent() {
        let grid = Grid::new(4, 1);
        let mut search = AStarSearch::new(&grid, p(0, 0), p(3, 0)).unwrap();

        assert!(search.discover(p(2, 0), 5.0, 0));
        let idx = search.open[&p(2, 0)];
        assert_eq!(search.nodes[idx].f, 6.0);

        assert!(!search.discover(p(2, 0), 2.0, 0));
        assert_eq!(search.nodes[idx].g, 2.0);
        assert_eq!(search.nodes[idx].f, 3.0);
        assert_eq!(search.stats().relaxed, 1);

        // Not strictly cheaper: ignored.
        assert!(!search.discover(p(2, 0), 2.0, 0));
        assert!(!search.discover(p(2, 0), 4.0, 0));
        assert_eq!(search.nodes[idx].g, 2.0);
        assert_eq!(search.stats().relaxed, 1);
        assert_open_nodes_consistent(&search);

        // The stale f=6 entry is skipped; the node pops once.
        assert_eq!(search.pop_frontier(), Some(0));
        assert_eq!(search.pop_frontier(), Some(idx));
        assert_eq!(search.pop_frontier(), None);
    }

    #[test]
    fn frontier_stays_consistent_while_stepping() {
        let mut grid = grid_with_walls(
            10,
            10,
            &[(4, 0), (4, 1), (4, 2), (4, 3), (4, 4), (4, 5), (4, 6), (4, 7)],
        );
        let mut search = AStarSearch::new(&grid, p(0, 0), p(9, 0)).unwrap();
        let path = loop {
            assert_open_nodes_consistent(&search);
            match search.step(&mut grid) {
                Step::Expanded(_) => {}
                Step::Found(path) => break path,
                Step::Exhausted => panic!("wall leaves a gap"),
            }
        };
        assert!(path.contains(&p(4, 8)) || path.contains(&p(4, 9)));
        assert_eq!(search.stats().path_len, path.len());
        let cost = search.stats().path_cost.unwrap();
        assert!((cost - path_cost(&path)).abs() < 1e-9);
    }

    #[test]
    fn blocked_start_stays_blocked() {
        let mut grid = grid_with_walls(3, 3, &[(0, 0)]);
        let path = search(&mut grid, p(0, 0), p(2, 2)).unwrap();
        assert_eq!(path.len(), 3);
        assert!(grid.is_blocked(p(0, 0)));
    }

    #[test]
    fn blocked_goal_is_unreachable() {
        let mut grid = grid_with_walls(3, 3, &[(2, 2)]);
        assert!(search(&mut grid, p(0, 0), p(2, 2)).unwrap().is_empty());
    }

    #[test]
    fn find_path_records_stats() {
        let mut grid = Grid::new(6, 6);
        let mut astar = AStar::new();
        assert!(astar.last_stats().is_none());
        let path = astar.find_path(&mut grid, p(0, 0), p(5, 3)).unwrap();
        let stats = astar.last_stats().unwrap();
        assert_eq!(stats.path_len, path.len());
        assert!(stats.expanded >= path.len());
        assert!(stats.opened >= path.len() - 1);
    }
}
