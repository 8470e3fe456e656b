//! Grid shortest-path search with A*.
//!
//! [`algorithms::a_star::search`] finds the cheapest eight-connected path
//! between two cells and leaves its progress in the grid: cells enter the
//! frontier as [`Cell::Open`] and are finalized as [`Cell::Closed`].
//! [`task::SearchTask`] runs the same search on a worker thread so the grid
//! can be drawn while it fills in.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod grid;
pub mod statistics;
pub mod task;

pub use algorithms::a_star::{search, AStar, AStarSearch, Step};
pub use algorithms::common::PathfindingAlgorithm;
pub use error::{Result, SearchError};
pub use grid::{Cell, Grid, Position};
pub use statistics::SearchStats;
pub use task::{SearchOutcome, SearchTask, SharedGrid};
