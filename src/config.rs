use crate::error::Result;
use crate::grid::{Grid, Position};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;

/// Watch A* find the shortest path across a grid with obstacles.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    #[arg(long, default_value_t = 60)]
    pub height: usize,

    #[arg(long, default_value_t = 10)]
    pub start_x: usize,

    #[arg(long, default_value_t = 10)]
    pub start_y: usize,

    #[arg(long, default_value_t = 70)]
    pub goal_x: usize,

    #[arg(long, default_value_t = 50)]
    pub goal_y: usize,

    /// Randomly placed blocked cells (ignored with --map)
    #[arg(long, default_value_t = 800)]
    pub num_walls: usize,

    /// Seed for wall placement; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pause before every expansion
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,

    /// How often the progress view is redrawn
    #[arg(long, default_value_t = 100)]
    pub refresh_ms: u64,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    /// Read the grid from a text file (`#` wall, `.` free, `S` start, `G` goal)
    #[arg(long)]
    pub map: Option<PathBuf>,
}

/// A grid ready to search, with its endpoints.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub grid: Grid,
    pub start: Position,
    pub goal: Position,
    pub seed: Option<u64>,
}

impl Config {
    pub fn start(&self) -> Position {
        Position::new(self.start_x, self.start_y)
    }

    pub fn goal(&self) -> Position {
        Position::new(self.goal_x, self.goal_y)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }

    /// Build the grid described by this configuration and check that both
    /// endpoints lie on it. `S`/`G` markers in a map file override the
    /// coordinate flags.
    pub fn scenario(&self) -> Result<Scenario> {
        let scenario = match &self.map {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                let (grid, start, goal) = Grid::parse(&text)?;
                Scenario {
                    grid,
                    start: start.unwrap_or_else(|| self.start()),
                    goal: goal.unwrap_or_else(|| self.goal()),
                    seed: None,
                }
            }
            None => {
                let seed = self.seed.unwrap_or_else(rand::random);
                let mut rng = StdRng::seed_from_u64(seed);
                let (start, goal) = (self.start(), self.goal());
                Scenario {
                    grid: Grid::with_random_walls(
                        self.width,
                        self.height,
                        self.num_walls,
                        &[start, goal],
                        &mut rng,
                    ),
                    start,
                    goal,
                    seed: Some(seed),
                }
            }
        };

        scenario.grid.check_bounds(scenario.start)?;
        scenario.grid.check_bounds(scenario.goal)?;
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::grid::Cell;

    #[test]
    fn defaults_match_the_classic_layout() {
        let config = Config::parse_from(["astar-visualizer"]);
        assert_eq!((config.width, config.height), (80, 60));
        assert_eq!(config.start(), Position::new(10, 10));
        assert_eq!(config.goal(), Position::new(70, 50));
        assert_eq!(config.delay(), Duration::ZERO);
        assert!(config.map.is_none());
    }

    #[test]
    fn seeded_scenarios_repeat() {
        let config = Config::parse_from(["astar-visualizer", "--seed", "42", "--num-walls", "300"]);
        let a = config.scenario().unwrap();
        let b = config.scenario().unwrap();
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.seed, Some(42));
        assert!(a.grid.count(Cell::Blocked) > 0);
        assert!(!a.grid.is_blocked(a.start));
        assert!(!a.grid.is_blocked(a.goal));
    }

    #[test]
    fn endpoints_must_fit_the_grid() {
        let config = Config::parse_from([
            "astar-visualizer",
            "--width",
            "20",
            "--height",
            "20",
            "--seed",
            "1",
        ]);
        let err = config.scenario().unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument { .. }));
    }
}
