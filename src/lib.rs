//! Fill a crossword grid with words from a vocabulary, treating it as a constraint satisfaction
//! problem: each slot is a variable, its domain is the words that could go there, and crossing
//! slots must agree on their shared letter. Solving runs node consistency, then AC-3, then a
//! backtracking search ordered by minimum remaining values and degree.

pub mod consistency;
pub mod domains;
pub mod grid;
pub mod render;
pub mod search;
pub mod vocabulary;

#[cfg(test)]
mod test_support;

pub use grid::{Direction, GridConfig, GridError, Slot};
pub use render::render_grid;
pub use search::{
    solve, solve_with_options, Assignment, FillFailure, FillSuccess, SolveOptions, Solver,
    Statistics, ValueOrder,
};
pub use vocabulary::{Vocabulary, Word};

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given slot, based on its index in the grid's `slots` field.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the `Vocabulary`.
pub type WordId = usize;

/// Zero-indexed `(row, col)` coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);
