use astar_visualizer::algorithms::reference;
use astar_visualizer::config::{Config, Scenario};
use astar_visualizer::grid::{Cell, Position};
use astar_visualizer::task::{self, SearchOutcome, SearchTask, SharedGrid};
use clap::Parser;
use env_logger::Env;
use log::info;
use std::thread;

fn draw(grid: &SharedGrid, path: &[Position], start: Position, goal: Position) {
    let Ok(grid) = grid.read() else {
        return;
    };
    // Clear the terminal and home the cursor.
    print!("\x1B[2J\x1B[H");
    println!("Legend: S=Start, G=Goal, *=Path, #=Blocked, o=Open, x=Closed, .=Unblocked");
    print!("{}", grid.render(path, start, goal));
    println!(
        "Open: {}  Closed: {}",
        grid.count(Cell::Open),
        grid.count(Cell::Closed)
    );
}

fn print_results(outcome: &SearchOutcome, optimal: Option<f64>) {
    println!("\n=== FINAL RESULTS ===");
    println!("{}", outcome.stats);

    match (outcome.stats.path_cost, optimal) {
        (Some(_), Some(optimal)) => {
            println!("Optimal path length: {:.3}", optimal);
            if let Some(ratio) = outcome.stats.optimality_ratio(optimal) {
                println!("Route efficiency: {:.3}", ratio);
            }
        }
        (None, None) => println!("Goal is unreachable from start"),
        (found, optimal) => {
            // Only possible if the search and the reference disagree.
            eprintln!(
                "Warning: search found {:?} but the reference found {:?}",
                found, optimal
            );
        }
    }
}

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::parse();

    let Scenario {
        grid,
        start,
        goal,
        seed,
    } = match config.scenario() {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!("Starting A* search...");
    println!("Grid size: {}x{}", grid.width(), grid.height());
    println!("Walls: {}", grid.count(Cell::Blocked));
    println!("Start: {}, Goal: {}", start, goal);
    if let Some(seed) = seed {
        println!("Seed: {} (for reproducibility)", seed);
    }
    if config.no_visualization {
        println!("Visualization disabled - running in fast mode");
    } else {
        println!("Visualization enabled with {}ms delay", config.delay_ms);
    }
    println!();

    let optimal = reference::optimal_cost(&grid, start, goal);
    let shared = task::shared(grid);

    let mut search = match SearchTask::spawn(shared.clone(), start, goal, config.delay()) {
        Ok(search) => search,
        Err(e) => {
            eprintln!("Failed to start search: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = if config.no_visualization {
        search.join()
    } else {
        loop {
            if let Some(outcome) = search.poll() {
                break outcome;
            }
            draw(&shared, &[], start, goal);
            println!("Expanded: {}", search.progress());
            thread::sleep(config.refresh_interval());
        }
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Search failed: {}", e);
            std::process::exit(1);
        }
    };

    if config.no_visualization {
        if let Ok(grid) = shared.read() {
            print!("{}", grid.render(&outcome.path, start, goal));
        }
    } else {
        draw(&shared, &outcome.path, start, goal);
    }

    info!(
        "search finished after {} expansions in {:.2?}",
        outcome.stats.expanded, outcome.stats.elapsed
    );
    print_results(&outcome, optimal);
}
