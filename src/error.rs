//! Error types for the search engine.
//!
//! Not finding a path is a normal outcome (an empty path), never an error.

use crate::grid::Position;

/// Result type alias
pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Start or goal lies outside the grid
    #[error("position {position} is outside the {width}x{height} grid")]
    InvalidArgument {
        position: Position,
        width: usize,
        height: usize,
    },

    /// The shared grid lock was poisoned by a panicking writer
    #[error("grid is unavailable: a writer panicked while holding it")]
    GridUnavailable,

    /// The background search thread panicked
    #[error("search worker panicked")]
    WorkerPanicked,

    /// The outcome of a background search was already taken by `poll`
    #[error("search outcome was already taken")]
    OutcomeTaken,

    /// A text map could not be parsed
    #[error("invalid map: {0}")]
    InvalidMap(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
