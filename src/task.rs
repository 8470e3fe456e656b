//! Running a search on a worker thread while others watch the grid.
//!
//! The worker holds the grid's write lock for exactly one expansion at a
//! time and sleeps between expansions without it, so a renderer taking the
//! read lock sees a grid at most one expansion behind. An editor must not
//! change walls while a task is running; nothing here enforces that.
//!
//! There is no cancellation: a task runs until it finds the goal or
//! exhausts the frontier. Callers that lose interest simply drop the task.

use crate::algorithms::a_star::{AStarSearch, Step};
use crate::error::{Result, SearchError};
use crate::grid::{Grid, Position};
use crate::statistics::SearchStats;
use log::{debug, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub type SharedGrid = Arc<RwLock<Grid>>;

pub fn shared(grid: Grid) -> SharedGrid {
    Arc::new(RwLock::new(grid))
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Start to goal inclusive, empty when the goal is unreachable
    pub path: Vec<Position>,
    pub stats: SearchStats,
}

pub struct SearchTask {
    handle: Option<JoinHandle<Result<SearchOutcome>>>,
    progress: Arc<AtomicUsize>,
}

impl SearchTask {
    /// Start searching from `start` to `goal` on a worker thread, sleeping
    /// `delay` before each expansion.
    ///
    /// Endpoints are checked before the worker starts, so an out-of-bounds
    /// position is reported here rather than from [`join`](Self::join).
    pub fn spawn(grid: SharedGrid, start: Position, goal: Position, delay: Duration) -> Result<Self> {
        {
            let guard = grid.read().map_err(|_| SearchError::GridUnavailable)?;
            guard.check_bounds(start)?;
            guard.check_bounds(goal)?;
        }

        let progress = Arc::new(AtomicUsize::new(0));
        let worker_progress = Arc::clone(&progress);
        let handle = thread::Builder::new()
            .name("astar-search".to_string())
            .spawn(move || run_worker(&grid, start, goal, delay, &worker_progress))?;

        debug!("[SearchTask] spawned search {} -> {} (delay {:?})", start, goal, delay);
        Ok(SearchTask {
            handle: Some(handle),
            progress,
        })
    }

    /// Nodes expanded so far.
    pub fn progress(&self) -> usize {
        self.progress.load(Ordering::Relaxed)
    }

    /// Whether the worker has stopped. Never blocks.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Take the outcome if the worker has stopped, without blocking.
    ///
    /// Returns `None` while the search is still running, and also on every
    /// call after the outcome has been taken.
    pub fn poll(&mut self) -> Option<Result<SearchOutcome>> {
        if !self.handle.as_ref()?.is_finished() {
            return None;
        }
        self.handle.take().map(join_handle)
    }

    /// Block until the search completes.
    pub fn join(mut self) -> Result<SearchOutcome> {
        match self.handle.take() {
            Some(handle) => join_handle(handle),
            None => Err(SearchError::OutcomeTaken),
        }
    }
}

fn join_handle(handle: JoinHandle<Result<SearchOutcome>>) -> Result<SearchOutcome> {
    handle.join().unwrap_or_else(|_| {
        warn!("[SearchTask] search worker panicked");
        Err(SearchError::WorkerPanicked)
    })
}

fn run_worker(
    grid: &SharedGrid,
    start: Position,
    goal: Position,
    delay: Duration,
    progress: &AtomicUsize,
) -> Result<SearchOutcome> {
    let started = Instant::now();
    let mut search = {
        let guard = grid.read().map_err(|_| SearchError::GridUnavailable)?;
        AStarSearch::new(&guard, start, goal)?
    };

    let path = loop {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let step = {
            let mut guard = grid.write().map_err(|_| SearchError::GridUnavailable)?;
            search.step(&mut guard)
        };
        progress.store(search.stats().expanded, Ordering::Relaxed);

        match step {
            Step::Expanded(_) => {}
            Step::Found(path) => break path,
            Step::Exhausted => break Vec::new(),
        }
    };

    let mut stats = search.stats().clone();
    stats.elapsed = started.elapsed();
    Ok(SearchOutcome { path, stats })
}
