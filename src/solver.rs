use std::time::{Duration, Instant};

use log::debug;
use rand::rng;
use rand::RngExt;

use crate::puzzle::{col_of, row_of, Puzzle, GRID_CELLS};

/// Wall-clock budget for one `solve` call, checked between passes.
pub const SOLVE_BUDGET: Duration = Duration::from_millis(200);

/// Wall-clock budget for one `generate` call.
pub const GENERATE_BUDGET: Duration = Duration::from_secs(1);

/// Solve by iterated single-candidate elimination.
///
/// Each pass computes candidates for every empty cell against the grid as
/// it stood at the start of the pass, commits a cell only when exactly one
/// digit is legal there, and applies all commitments together. The loop
/// ends when the grid is complete, a pass resolves nothing, or the time
/// budget runs out. `None` means the puzzle is out of reach for this
/// technique: cells kept zero or multiple candidates in every remaining
/// pass. Puzzles needing guesswork or chained hypotheses are reported
/// unsolvable rather than guessed at.
pub fn solve(puzzle: &Puzzle) -> Option<Puzzle> {
    let start = Instant::now();
    let mut current = *puzzle;
    let mut passes = 0u32;

    loop {
        if current.is_complete() {
            debug!("solved after {} passes", passes);
            return Some(current);
        }

        let mut next = current;
        let mut resolved = 0usize;
        for index in 0..GRID_CELLS {
            if !current.is_empty_at(index) {
                continue;
            }
            if let Some(value) = sole_candidate(&current, index) {
                next = next.with_value(index, value);
                resolved += 1;
            }
        }
        current = next;
        passes += 1;

        if resolved == 0 || start.elapsed() > SOLVE_BUDGET {
            if current.is_complete() {
                debug!("solved after {} passes", passes);
                return Some(current);
            }
            debug!(
                "gave up after {} passes, {} cells left",
                passes,
                current.empty_cells()
            );
            return None;
        }
    }
}

/// The one legal digit for an empty cell, or `None` when the cell has zero
/// or several candidates.
fn sole_candidate(puzzle: &Puzzle, index: usize) -> Option<u8> {
    let row = row_of(index);
    let col = col_of(index);
    let mut sole = None;
    for value in 1..=9 {
        if puzzle.check_col_placement(row, col, value)
            && puzzle.check_region_placement(row, col, value)
            && puzzle.check_row_placement(row, col, value)
        {
            if sole.is_some() {
                return None;
            }
            sole = Some(value);
        }
    }
    sole
}

/// Build a random puzzle that `solve` can finish.
///
/// Random legal clues are added one at a time; after every accepted clue
/// the grid is test-solved. A grid that reaches 41 clues without becoming
/// deducible is a dead end and is restarted from empty. The run as a whole
/// is bounded by `GENERATE_BUDGET`; generation is fallible and returns
/// `None` when the budget expires first.
pub fn generate() -> Option<Puzzle> {
    let mut rng = rng();
    let deadline = Instant::now() + GENERATE_BUDGET;
    let mut grid = Puzzle::empty();

    loop {
        if Instant::now() >= deadline {
            debug!("generation budget exhausted");
            return None;
        }
        if grid.empty_cells() <= 40 {
            debug!("dead end at 41 clues, restarting from an empty grid");
            grid = Puzzle::empty();
        }

        let index = rng.random_range(0..GRID_CELLS);
        if !grid.is_empty_at(index) {
            continue;
        }
        let value: u8 = rng.random_range(1..=9);
        let row = row_of(index);
        let col = col_of(index);
        if !grid.check_col_placement(row, col, value)
            || !grid.check_row_placement(row, col, value)
            || !grid.check_region_placement(row, col, value)
        {
            continue;
        }

        grid = grid.with_value(index, value);
        if solve(&grid).is_some() {
            break;
        }
    }

    // The finished grid goes through the same checks the API runs before
    // anything is handed out.
    let finished: Puzzle = grid.to_string().parse().ok()?;
    if !finished.is_consistent() || solve(&finished).is_none() {
        debug!("generated grid failed end-to-end validation");
        return None;
    }
    debug!("generated a puzzle with {} clues", GRID_CELLS - finished.empty_cells());
    Some(finished)
}
