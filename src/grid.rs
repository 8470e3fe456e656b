use crate::error::{Result, SearchError};
use pathfinding::matrix::Matrix;
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Status of a single grid cell.
///
/// `Blocked` and `Unblocked` are set by whoever edits the grid; the search
/// moves traversable cells to `Open` when they enter the frontier and to
/// `Closed` once their cost is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    Blocked,
    #[default]
    Unblocked,
    Open,
    Closed,
}

impl Cell {
    fn symbol(self) -> char {
        match self {
            Cell::Blocked => '#',
            Cell::Unblocked => '.',
            Cell::Open => 'o',
            Cell::Closed => 'x',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    // Row `y`, column `x`.
    cells: Matrix<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            cells: Matrix::new(height, width, Cell::Unblocked),
        }
    }

    /// Build a grid of `width x height` with up to `num_walls` randomly placed
    /// blocked cells. Positions in `keep_free` are never blocked.
    pub fn with_random_walls<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        num_walls: usize,
        keep_free: &[Position],
        rng: &mut R,
    ) -> Self {
        let mut grid = Grid::new(width, height);
        if width == 0 || height == 0 {
            return grid;
        }

        // Place walls randomly, ensuring we don't block start/goal
        let mut walls_placed = 0;
        let mut attempts = 0;
        while walls_placed < num_walls && attempts < num_walls * 3 {
            let pos = Position {
                x: rng.gen_range(0..width),
                y: rng.gen_range(0..height),
            };

            if !keep_free.contains(&pos) && grid.cells[(pos.y, pos.x)] == Cell::Unblocked {
                grid.cells[(pos.y, pos.x)] = Cell::Blocked;
                walls_placed += 1;
            }
            attempts += 1;
        }

        grid
    }

    /// Parse a grid from rows of text. `#` is blocked, `.`, `S` and `G` are
    /// traversable; `S` and `G` additionally mark the start and goal.
    pub fn parse(text: &str) -> Result<(Grid, Option<Position>, Option<Position>)> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(SearchError::InvalidMap("map is empty".to_string()));
        }

        let mut grid = Grid::new(width, height);
        let mut start = None;
        let mut goal = None;
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(SearchError::InvalidMap(format!(
                    "row {} has {} columns, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            for (x, c) in row.chars().enumerate() {
                let pos = Position { x, y };
                match c {
                    '#' => grid.cells[(y, x)] = Cell::Blocked,
                    '.' => {}
                    'S' => start = Some(pos),
                    'G' => goal = Some(pos),
                    other => {
                        return Err(SearchError::InvalidMap(format!(
                            "unexpected character {:?} at {}",
                            other, pos
                        )))
                    }
                }
            }
        }
        Ok((grid, start, goal))
    }

    pub fn width(&self) -> usize {
        self.cells.columns
    }

    pub fn height(&self) -> usize {
        self.cells.rows
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width() && pos.y < self.height()
    }

    pub fn check_bounds(&self, pos: Position) -> Result<()> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(SearchError::InvalidArgument {
                position: pos,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.cells.get((pos.y, pos.x)).copied()
    }

    pub fn set(&mut self, pos: Position, cell: Cell) -> Result<()> {
        self.check_bounds(pos)?;
        self.cells[(pos.y, pos.x)] = cell;
        Ok(())
    }

    pub fn is_blocked(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Blocked)
    }

    /// Flip a cell between blocked and traversable, returning its new status.
    pub fn toggle_blocked(&mut self, pos: Position) -> Result<Cell> {
        self.check_bounds(pos)?;
        let cell = &mut self.cells[(pos.y, pos.x)];
        *cell = match *cell {
            Cell::Blocked => Cell::Unblocked,
            _ => Cell::Blocked,
        };
        Ok(*cell)
    }

    /// Forget the progress of a previous search but keep the walls.
    pub fn clear_search_state(&mut self) {
        self.for_each_cell(|cell| {
            if matches!(*cell, Cell::Open | Cell::Closed) {
                *cell = Cell::Unblocked;
            }
        });
    }

    /// Make every cell traversable again.
    pub fn reset(&mut self) {
        self.for_each_cell(|cell| *cell = Cell::Unblocked);
    }

    pub fn count(&self, status: Cell) -> usize {
        let mut n = 0;
        for y in 0..self.height() {
            for x in 0..self.width() {
                if self.cells[(y, x)] == status {
                    n += 1;
                }
            }
        }
        n
    }

    fn for_each_cell(&mut self, mut f: impl FnMut(&mut Cell)) {
        for y in 0..self.height() {
            for x in 0..self.width() {
                f(&mut self.cells[(y, x)]);
            }
        }
    }

    /// Render the grid as text, one row per line.
    ///
    /// Legend: S=Start, G=Goal, *=Path, #=Blocked, o=Open, x=Closed, .=Unblocked
    pub fn render(&self, path: &[Position], start: Position, goal: Position) -> String {
        let mut out = String::with_capacity((self.width() + 1) * self.height());
        for y in 0..self.height() {
            for x in 0..self.width() {
                let pos = Position { x, y };
                let c = if pos == start {
                    'S'
                } else if pos == goal {
                    'G'
                } else if path.contains(&pos) {
                    '*'
                } else {
                    self.cells[(y, x)].symbol()
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}
